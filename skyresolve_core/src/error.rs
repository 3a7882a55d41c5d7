// src/error.rs
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Transport failure or per-call timeout.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success status or an unusable payload body.
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// Payload did not match the expected schema.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl ResolveError {
    pub fn network(message: impl Into<String>) -> Self {
        ResolveError::Network(message.into())
    }

    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        ResolveError::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        ResolveError::Parse(message.into())
    }

    /// Transient failures worth a second attempt. Malformed data and
    /// cancellation never are.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ResolveError::Network(_) | ResolveError::Upstream { .. }
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResolveError::Cancelled)
    }

    pub fn code_str(&self) -> &'static str {
        match self {
            ResolveError::Network(_) => "network_error",
            ResolveError::Upstream { .. } => "upstream_error",
            ResolveError::Parse(_) => "parse_error",
            ResolveError::Cancelled => "cancelled",
            ResolveError::InvalidInput(_) => "invalid_input",
            ResolveError::Config(_) => "config_error",
            ResolveError::Io(_) => "internal_error",
            ResolveError::SerdeJson(_) => "parse_error",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "code": self.code_str(),
            "message": self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ResolveError::network("reset").is_retryable());
        assert!(ResolveError::upstream(503, "busy").is_retryable());
        assert!(!ResolveError::parse("bad xml").is_retryable());
        assert!(!ResolveError::Cancelled.is_retryable());
    }

    #[test]
    fn test_code_str_is_stable() {
        assert_eq!(ResolveError::Cancelled.code_str(), "cancelled");
        assert_eq!(ResolveError::upstream(500, "x").code_str(), "upstream_error");
        let value = ResolveError::parse("missing field").to_json();
        assert_eq!(value["code"], "parse_error");
    }
}
