use super::context::CallerContext;

/// An entity partitioned by tenant scope.
pub trait Scoped {
    fn scope(&self) -> &str;
}

/// Two-tier visibility over a fetched result set: `Super` callers see every
/// item, everyone else only items in their own scope. Applied after the
/// gate; the gate decides whether the operation runs at all.
pub fn filter_visible<T: Scoped>(caller: &CallerContext, items: Vec<T>) -> Vec<T> {
    if caller.is_super() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| item.scope() == caller.scope)
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{filter_visible, Scoped};
    use crate::auth::{CallerContext, Role};

    struct Row(&'static str, &'static str);

    impl Scoped for Row {
        fn scope(&self) -> &str {
            self.1
        }
    }

    fn rows() -> Vec<Row> {
        vec![Row("u1", "A"), Row("u2", "A"), Row("u3", "B")]
    }

    #[test]
    fn non_super_caller_sees_only_own_scope() {
        let caller = CallerContext::new("caller-1", "A").roles([Role::Admin].into());
        let visible = filter_visible(&caller, rows());
        assert_eq!(
            visible.iter().map(|r| r.0).collect::<Vec<_>>(),
            vec!["u1", "u2"]
        );
    }

    #[test]
    fn super_caller_sees_all_scopes() {
        let caller = CallerContext::new("caller-1", "A").roles([Role::Super].into());
        let visible = filter_visible(&caller, rows());
        assert_eq!(visible.len(), 3);
    }
}
