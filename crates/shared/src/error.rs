use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The request never produced an HTTP response.
    Network,
    /// Non-2xx response with a plain or empty `detail`.
    HttpStatus,
    /// Non-2xx response carrying field-level `detail[]` entries.
    Validation,
    /// 2xx response whose body did not match the expected shape.
    MalformedResponse,
    /// The response was fine but local credential persistence failed.
    Credentials,
}

/// One segment of a validation error location, e.g. `["body", "new_user", "email"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocSegment {
    Name(String),
    Index(i64),
}

impl LocSegment {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Index(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDetail {
    #[serde(default)]
    pub loc: Vec<LocSegment>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Validation(Vec<ValidationDetail>),
    Empty,
}

/// The normalized error value carried by every FAILURE lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind:?} failure (status {status:?}): {detail:?}")]
pub struct ApiFailure {
    pub kind: FailureKind,
    #[serde(default)]
    pub status: Option<u16>,
    pub detail: ErrorDetail,
}

impl ApiFailure {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Network,
            status: None,
            detail: ErrorDetail::Message(message.into()),
        }
    }

    pub fn malformed(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::MalformedResponse,
            status: Some(status),
            detail: ErrorDetail::Message(message.into()),
        }
    }

    pub fn credentials(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Credentials,
            status,
            detail: ErrorDetail::Message(message.into()),
        }
    }

    /// Classifies a non-2xx response body. FastAPI puts either a string or a
    /// list of `{loc, msg, type}` entries under `detail`.
    pub fn from_status(status: u16, body: &Value) -> Self {
        let detail = match body.get("detail") {
            Some(Value::String(message)) => ErrorDetail::Message(message.clone()),
            Some(raw @ Value::Array(_)) => {
                match serde_json::from_value::<Vec<ValidationDetail>>(raw.clone()) {
                    Ok(entries) => ErrorDetail::Validation(entries),
                    Err(_) => ErrorDetail::Message(raw.to_string()),
                }
            }
            Some(Value::Null) | None => match body {
                Value::String(text) if !text.is_empty() => ErrorDetail::Message(text.clone()),
                _ => ErrorDetail::Empty,
            },
            Some(other) => ErrorDetail::Message(other.to_string()),
        };

        let kind = match detail {
            ErrorDetail::Validation(_) => FailureKind::Validation,
            _ => FailureKind::HttpStatus,
        };

        Self {
            kind,
            status: Some(status),
            detail,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match &self.detail {
            ErrorDetail::Message(message) => Some(message),
            _ => None,
        }
    }

    pub fn validation_details(&self) -> &[ValidationDetail] {
        match &self.detail {
            ErrorDetail::Validation(entries) => entries,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn string_detail_is_http_status_failure() {
        let failure = ApiFailure::from_status(401, &json!({"detail": "Could not validate token."}));
        assert_eq!(failure.kind, FailureKind::HttpStatus);
        assert_eq!(failure.status, Some(401));
        assert_eq!(failure.message(), Some("Could not validate token."));
    }

    #[test]
    fn list_detail_is_validation_failure_with_mixed_locations() {
        let failure = ApiFailure::from_status(
            422,
            &json!({"detail": [
                {"loc": ["body", "new_user", "email"], "msg": "value is not a valid email address", "type": "value_error.email"},
                {"loc": ["query", "page_chunk_size", 0], "msg": "bad", "type": "type_error"}
            ]}),
        );
        assert_eq!(failure.kind, FailureKind::Validation);
        let entries = failure.validation_details();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].loc[2], LocSegment::Name("email".into()));
        assert_eq!(entries[1].loc[2], LocSegment::Index(0));
        assert_eq!(entries[0].kind.as_deref(), Some("value_error.email"));
    }

    #[test]
    fn missing_detail_keeps_plain_text_body() {
        let failure = ApiFailure::from_status(502, &Value::String("Bad Gateway".into()));
        assert_eq!(failure.message(), Some("Bad Gateway"));

        let failure = ApiFailure::from_status(500, &Value::Null);
        assert_eq!(failure.detail, ErrorDetail::Empty);
    }
}
