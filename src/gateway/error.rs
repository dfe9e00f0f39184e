//! Error types for gateway requests.

use thiserror::Error;

/// Errors that can occur when talking to the monitoring gateway.
///
/// Variants carry owned strings so the last error of a query can be kept
/// around for rendering.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The gateway answered with a non-success status.
    #[error("HTTP {code}: {reason}")]
    Status {
        code: u16,
        reason: String,
        /// Response body, parsed as JSON when possible.
        body: Option<serde_json::Value>,
    },

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Any other request failure.
    #[error("HTTP request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_connect() {
            GatewayError::Connection(err.to_string())
        } else if err.is_decode() {
            GatewayError::Parse(err.to_string())
        } else {
            GatewayError::Request(err.to_string())
        }
    }
}

/// Message and optional details for an inline error panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: String,
    pub details: Option<String>,
}

impl GatewayError {
    /// Build a status error from the code, reason phrase and raw body text.
    pub fn from_status(code: u16, reason: &str, body: &str) -> Self {
        let body = if body.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str(body)
                    .unwrap_or_else(|_| serde_json::Value::String(body.to_string())),
            )
        };
        GatewayError::Status {
            code,
            reason: reason.to_string(),
            body,
        }
    }

    /// The HTTP status code, if the gateway answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GatewayError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// The plain message carried by this error, if any.
    fn message(&self) -> Option<String> {
        let message = match self {
            GatewayError::Status { reason, .. } => Some(reason.clone()),
            GatewayError::Connection(msg) | GatewayError::Parse(msg) | GatewayError::Request(msg) => {
                Some(msg.clone())
            }
            GatewayError::Timeout => Some("Request timed out".to_string()),
        };
        message.filter(|msg| !msg.trim().is_empty())
    }

    /// Extract something readable for an error panel.
    ///
    /// Tries the structured response body first, then the error message,
    /// and finally the debug representation of the error itself.
    pub fn report(&self) -> ErrorReport {
        if let GatewayError::Status {
            code,
            reason,
            body: Some(body),
        } = self
        {
            let reason = if reason.is_empty() { "unknown" } else { reason };
            return ErrorReport {
                message: format!("Error {}: {}", code, reason),
                details: serde_json::to_string_pretty(body).ok(),
            };
        }

        if let Some(message) = self.message() {
            return ErrorReport {
                message,
                details: None,
            };
        }

        ErrorReport {
            message: format!("{:?}", self),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_prefers_structured_body() {
        let err = GatewayError::from_status(400, "Bad Request", r#"{"error":"missing id"}"#);
        let report = err.report();
        assert_eq!(report.message, "Error 400: Bad Request");
        assert!(report.details.unwrap().contains("missing id"));
        assert_eq!(err.status_code(), Some(400));
    }

    #[test]
    fn test_report_keeps_plain_text_body() {
        let err = GatewayError::from_status(502, "Bad Gateway", "upstream down");
        assert_eq!(
            err.report().details.as_deref(),
            Some("\"upstream down\"")
        );
    }

    #[test]
    fn test_report_falls_back_to_message() {
        let err = GatewayError::Connection("refused".to_string());
        assert_eq!(
            err.report(),
            ErrorReport {
                message: "refused".to_string(),
                details: None
            }
        );

        let err = GatewayError::from_status(404, "Not Found", "");
        assert_eq!(err.report().message, "Not Found");
    }

    #[test]
    fn test_report_falls_back_to_debug() {
        let err = GatewayError::Request(String::new());
        assert_eq!(err.report().message, "Request(\"\")");
    }
}
