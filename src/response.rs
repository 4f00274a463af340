use derive_setters::Setters;
use serde::Serialize;

/// Count and identifiers reported by a mutating operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub affected: u64,
    pub ids: Vec<String>,
}

/// The uniform envelope every operation resolves to at the outer boundary.
/// Failures carry a message and omit the mutation fields; nothing escapes
/// the boundary as an unhandled fault.
#[derive(Debug, Clone, PartialEq, Serialize, Setters)]
#[serde(rename_all = "camelCase")]
pub struct Response<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
}

impl<T> Response<T> {
    pub fn ok(data: T) -> Self {
        Response {
            success: true,
            data: Some(data),
            message: None,
            affected_count: None,
            ids: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Response {
            success: false,
            data: None,
            message: Some(message.into()),
            affected_count: None,
            ids: None,
        }
    }

    /// Compose the boundary response for a data-bearing operation.
    pub fn new(result: crate::Result<T>) -> Self {
        match result {
            Ok(data) => Response::ok(data),
            Err(err) => Response::failure(err.to_string()),
        }
    }
}

impl Response<()> {
    /// Compose the boundary response for a mutating operation.
    pub fn mutation(result: crate::Result<Mutation>) -> Self {
        match result {
            Ok(mutation) => Response {
                success: true,
                data: None,
                message: None,
                affected_count: Some(mutation.affected),
                ids: Some(mutation.ids),
            },
            Err(err) => Response::failure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{Mutation, Response};
    use crate::Error;

    #[test]
    fn success_envelope_omits_failure_fields() {
        let response = Response::new(Ok("payload"));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "success": true, "data": "payload" })
        );
    }

    #[test]
    fn failure_envelope_omits_mutation_fields() {
        let response = Response::<()>::new(Err(Error::not_found("user", "u42")));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "success": false, "message": "user not found: u42" })
        );
    }

    #[test]
    fn mutation_envelope_reports_count_and_ids() {
        let response = Response::mutation(Ok(Mutation {
            affected: 1,
            ids: vec!["u1".to_string()],
        }));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "success": true, "affectedCount": 1, "ids": ["u1"] })
        );
    }
}
