//! Error types for the location and weather collaborators.
//!
//! None of these ever terminate the program: the controller turns them into
//! a log line, a notification, or both.

use thiserror::Error;

/// Failures while reading the current position.
///
/// Refused consent is not an error: it is settled before any read starts
/// (see [`crate::location::request_permission`]).
#[derive(Debug, Error)]
pub enum LocationError {
    /// The lookup service failed or returned something unusable.
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Failures of a single weather fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The service answered with a non-success status.
    #[error("weather service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The body did not match the expected response shape.
    #[error("unexpected response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FetchError {
    /// HTTP status of the failed response, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Network(e) => e.status().map(|s| s.as_u16()),
            FetchError::Parse(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_code_and_body() {
        let err = FetchError::Status {
            status: 404,
            body: r#"{"cod":"404","message":"city not found"}"#.to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("city not found"));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn parse_error_has_no_status() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = FetchError::from(json_err);
        assert_eq!(err.status(), None);
        assert!(err.to_string().starts_with("unexpected response"));
    }
}
