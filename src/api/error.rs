use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The token is missing, expired or revoked. The session must end.
    #[error("Session expired, please sign in again")]
    Unauthorized,
    /// 422 from the server with its field messages flattened.
    #[error("{0}")]
    Validation(String),
    #[error("HTTP error {status}: {message}")]
    HttpStatus { status: u16, message: String },
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
    /// The envelope came back with `success: false`.
    #[error("{0}")]
    Rejected(String),
    /// The task running the request panicked.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns true if this error is transient and repeating the action may
    /// succeed without user intervention.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Timeout(_) | ApiError::Network(_) => true,
            ApiError::HttpStatus { status, .. } => *status >= 500,
            ApiError::Unauthorized
            | ApiError::Validation(_)
            | ApiError::ResponseTooLarge(_)
            | ApiError::Decode(_)
            | ApiError::InvalidUrl(_)
            | ApiError::InsecureBaseUrl
            | ApiError::Rejected(_)
            | ApiError::Internal(_) => false,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Build the error for a non-2xx, non-401 response from its body.
    pub(crate) fn from_status(status: u16, body: &[u8]) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_slice(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|b| b.message.clone())
            .filter(|m| !m.is_empty());

        if status == 422 {
            let first_field_error = parsed
                .as_ref()
                .and_then(|b| b.errors.values().flatten().next().cloned());
            return ApiError::Validation(
                first_field_error
                    .or(message)
                    .unwrap_or_else(|| "Validation failed".to_string()),
            );
        }

        ApiError::HttpStatus {
            status,
            message: message.unwrap_or_else(|| "request failed".to_string()),
        }
    }
}

/// Error bodies look like `{message, errors: {field: [msg, ...]}}`.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_prefers_field_message() {
        let body = br#"{"message": "The given data was invalid.",
                        "errors": {"email": ["The email has already been taken."]}}"#;
        match ApiError::from_status(422, body) {
            ApiError::Validation(msg) => assert_eq!(msg, "The email has already been taken."),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_validation_falls_back_to_message() {
        let body = br#"{"message": "Invalid credentials"}"#;
        assert!(matches!(
            ApiError::from_status(422, body),
            ApiError::Validation(m) if m == "Invalid credentials"
        ));
    }

    #[test]
    fn test_non_json_body() {
        let err = ApiError::from_status(503, b"<html>down</html>");
        assert!(matches!(err, ApiError::HttpStatus { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ApiError::Timeout(30).is_retryable());
        assert!(!ApiError::Unauthorized.is_retryable());
        assert!(!ApiError::from_status(404, b"{}").is_retryable());
        assert!(ApiError::Unauthorized.is_unauthorized());
    }
}
