//! Client error types

use serde::Deserialize;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client errors
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the API
    #[error("API error ({status}): {}", summarize(.errors, .body))]
    Api {
        status: u16,
        errors: Vec<ApiErrorDetail>,
        body: String,
    },

    /// Response body could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request was cancelled before it completed
    #[error("Request cancelled")]
    Cancelled,
}

/// One entry of the API's error list
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ApiErrorDetail {
    /// Numeric error code
    #[serde(default)]
    pub code: Option<i64>,
    /// Human readable message
    pub message: String,
    /// Field the error refers to
    #[serde(default)]
    pub field: Option<String>,
    /// Extra structured detail
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct DetailOnly {
    detail: String,
}

impl ClientError {
    /// Build an API error from a non-success response body
    pub fn from_api_response(body: &str, status: u16) -> Self {
        let errors = if let Ok(list) = serde_json::from_str::<Vec<ApiErrorDetail>>(body) {
            list
        } else if let Ok(DetailOnly { detail }) = serde_json::from_str::<DetailOnly>(body) {
            vec![ApiErrorDetail {
                code: None,
                message: detail,
                field: None,
                detail: None,
            }]
        } else {
            Vec::new()
        };

        Self::Api {
            status,
            errors,
            body: body.to_string(),
        }
    }

    /// HTTP status of the failed response, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if this is an access denied error
    pub fn is_access_denied(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Check if the request was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

fn summarize(errors: &[ApiErrorDetail], body: &str) -> String {
    if errors.is_empty() {
        return body.to_string();
    }
    errors
        .iter()
        .map(|e| match &e.field {
            Some(field) => format!("{}: {}", field, e.message),
            None => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_list() {
        let body = r#"[
            {"code": 4999, "message": "Invalid URL", "field": "url", "detail": {}},
            {"code": 4417, "message": "Only one source may be given", "field": null, "detail": null}
        ]"#;

        let error = ClientError::from_api_response(body, 400);

        match &error {
            ClientError::Api { status, errors, .. } => {
                assert_eq!(*status, 400);
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].code, Some(4999));
                assert_eq!(errors[0].field.as_deref(), Some("url"));
                assert_eq!(errors[1].field, None);
            }
            _ => panic!("Expected Api error"),
        }
        assert_eq!(
            error.to_string(),
            "API error (400): url: Invalid URL; Only one source may be given"
        );
    }

    #[test]
    fn test_parse_detail_only() {
        let error = ClientError::from_api_response(r#"{"detail": "Not found."}"#, 404);
        assert!(error.is_not_found());
        assert_eq!(error.to_string(), "API error (404): Not found.");
    }

    #[test]
    fn test_unparseable_body_kept_raw() {
        let error = ClientError::from_api_response("<h1>Bad Gateway</h1>", 502);
        match &error {
            ClientError::Api { errors, body, .. } => {
                assert!(errors.is_empty());
                assert_eq!(body, "<h1>Bad Gateway</h1>");
            }
            _ => panic!("Expected Api error"),
        }
        assert_eq!(error.status(), Some(502));
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_access_denied() {
        assert!(ClientError::from_api_response("", 403).is_access_denied());
        assert!(ClientError::from_api_response("", 401).is_access_denied());
        assert!(!ClientError::Cancelled.is_access_denied());
        assert!(ClientError::Cancelled.is_cancelled());
    }
}
