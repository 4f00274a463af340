use super::policy::RolePolicy;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("insufficient role, requires one of: {required}")]
    Forbidden { required: RolePolicy },
}
