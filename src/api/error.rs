//! Error taxonomy for the API client.
//!
//! Every client operation returns [`ClientError`] on failure. Failures that
//! can be detected locally (missing identifiers, missing token, invalid form
//! input) are raised before any request is built.

use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// A required identifier was empty
    #[error("{0} is required")]
    MissingCredential(&'static str),

    /// A mutating call was attempted without a stored token
    #[error("No authentication token found")]
    Unauthenticated,

    #[error(
        "Request failed with status {status}{}",
        .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
    )]
    RequestFailed {
        status: StatusCode,
        message: Option<String>,
    },

    /// 2xx response whose body does not have the expected envelope
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Login succeeded but returned a role the dashboard does not serve
    #[error("Unsupported role: {0}")]
    UnsupportedRole(String),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::RequestFailed { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// True when the failure happened before anything was sent
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::MissingCredential(_)
                | ClientError::Unauthenticated
                | ClientError::Validation(_)
        )
    }
}

/// Error bodies the backend is known to produce
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    title: Option<String>,
}

/// Build a `RequestFailed` from a non-2xx status and its raw body.
///
/// The message is best effort: the first of `message`, `error` or `title`
/// found in a JSON body; a plain-text body is used as is when short.
pub(crate) fn request_failed(status: StatusCode, body: &str) -> ClientError {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message.or(parsed.error).or(parsed.title),
        Err(_) => {
            let trimmed = body.trim();
            if !trimmed.is_empty() && trimmed.len() <= 512 && !trimmed.starts_with('<') {
                Some(trimmed.to_string())
            } else {
                None
            }
        }
    };

    ClientError::RequestFailed {
        status,
        message: message.filter(|m| !m.is_empty()),
    }
}

/// Field-level validation failures collected before a request is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.len() == 1 {
            if let Some(first) = self.fields.values().next().and_then(|v| v.first()) {
                return f.write_str(first);
            }
        }
        write!(f, "Validation failed for {} fields", self.fields.len())
    }
}

impl std::error::Error for ValidationErrors {}

/// Builder for collecting multiple validation errors
#[derive(Debug, Default)]
pub struct ValidationErrorBuilder {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validation error for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    /// Record the error of a single-field check, if any
    pub fn check(&mut self, field: &str, result: Result<(), String>) -> &mut Self {
        if let Err(message) = result {
            self.add(field, message);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn build(self) -> Option<ValidationErrors> {
        if self.errors.is_empty() {
            None
        } else {
            Some(ValidationErrors {
                fields: self.errors,
            })
        }
    }

    /// Return Ok(()) if no errors were collected
    pub fn finish(self) -> Result<(), ValidationErrors> {
        match self.build() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_prefers_message_field() {
        let err = request_failed(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Voucher name already exists","error":"duplicate"}"#,
        );
        match err {
            ClientError::RequestFailed { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message.as_deref(), Some("Voucher name already exists"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_request_failed_falls_back_to_title() {
        let err = request_failed(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"title":"One or more validation errors occurred."}"#,
        );
        assert!(err
            .to_string()
            .contains("One or more validation errors occurred."));
    }

    #[test]
    fn test_request_failed_without_message() {
        let err = request_failed(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.to_string(), "Request failed with status 500 Internal Server Error");
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));

        let html = request_failed(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(html, ClientError::RequestFailed { message: None, .. }));
    }

    #[test]
    fn test_plain_text_body_becomes_message() {
        let err = request_failed(StatusCode::NOT_FOUND, "Business not found");
        assert!(matches!(
            err,
            ClientError::RequestFailed { message: Some(ref m), .. } if m == "Business not found"
        ));
    }

    #[test]
    fn test_local_errors() {
        assert!(ClientError::Unauthenticated.is_local());
        assert!(ClientError::MissingCredential("businessId").is_local());
        assert!(!ClientError::MalformedResponse("x".into()).is_local());
        assert_eq!(
            ClientError::MissingCredential("businessId").to_string(),
            "businessId is required"
        );
    }

    #[test]
    fn test_validation_builder() {
        let mut builder = ValidationErrorBuilder::new();
        builder.add("percent", "Percent must be between 0 and 100");
        builder.add("validTo", "validTo must be after validFrom");
        builder.add("percent", "Percent is required");
        builder.check("name", Ok(()));

        let err = builder.build().unwrap();
        assert_eq!(err.field("percent").unwrap().len(), 2);
        assert!(err.has_field("validTo"));
        assert!(!err.has_field("name"));
        assert_eq!(err.to_string(), "Validation failed for 2 fields");
    }

    #[test]
    fn test_single_field_message() {
        let mut builder = ValidationErrorBuilder::new();
        builder.check("name", Err("Name is required".to_string()));
        let err = builder.finish().unwrap_err();
        assert_eq!(err.to_string(), "Name is required");
    }
}
