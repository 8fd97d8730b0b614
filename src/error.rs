use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter `{param}`: expected {expected}")]
    InvalidParameter { param: String, expected: String },

    #[error("Invalid range for `{param}`: {reason}")]
    InvalidRange { param: String, reason: String },

    #[error("Invalid value `{value}` for `{param}`, expected one of: {}", .accepted.join(", "))]
    InvalidEnum {
        param: String,
        value: String,
        accepted: Vec<String>,
    },

    #[error("Transport error: {message}")]
    TransportError { message: String, timed_out: bool },

    #[error("Upstream returned HTTP {status}{}", .body.as_deref().map(|b| format!(": {b}")).unwrap_or_default())]
    UpstreamError { status: u16, body: Option<String> },

    #[error("Schema mismatch at `{path}`: {message}")]
    SchemaMismatch { path: String, message: String },

    #[error("Tool not found: {0}")]
    UnknownTool(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ToolError {
    /// Stable error kind forwarded to MCP clients.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::MissingParameter(_) => "MissingParameter",
            ToolError::InvalidParameter { .. } => "InvalidParameter",
            ToolError::InvalidRange { .. } => "InvalidRange",
            ToolError::InvalidEnum { .. } => "InvalidEnum",
            ToolError::TransportError { .. } => "TransportError",
            ToolError::UpstreamError { .. } => "UpstreamError",
            ToolError::SchemaMismatch { .. } => "SchemaMismatch",
            ToolError::UnknownTool(_) => "UnknownTool",
            ToolError::ConfigError(_) => "ConfigError",
        }
    }

    /// Whether a caller may reasonably retry the same invocation.
    pub fn is_retryable(&self) -> bool {
        match self {
            ToolError::TransportError { .. } => true,
            ToolError::UpstreamError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Validation-phase errors never touch the network.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ToolError::MissingParameter(_)
                | ToolError::InvalidParameter { .. }
                | ToolError::InvalidRange { .. }
                | ToolError::InvalidEnum { .. }
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ToolError::UpstreamError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_retryable_only_for_5xx() {
        let not_found = ToolError::UpstreamError {
            status: 404,
            body: Some("Not Found".to_string()),
        };
        let unavailable = ToolError::UpstreamError {
            status: 503,
            body: None,
        };
        assert!(!not_found.is_retryable());
        assert!(unavailable.is_retryable());
        assert_eq!(not_found.status(), Some(404));
    }

    #[test]
    fn test_transport_is_retryable() {
        let err = ToolError::TransportError {
            message: "request timed out".to_string(),
            timed_out: true,
        };
        assert!(err.is_retryable());
        assert!(!err.is_validation());
        assert_eq!(err.kind(), "TransportError");
    }

    #[test]
    fn test_display_messages() {
        let err = ToolError::UpstreamError {
            status: 404,
            body: Some("Pool not found".to_string()),
        };
        assert_eq!(err.to_string(), "Upstream returned HTTP 404: Pool not found");

        let err = ToolError::UpstreamError {
            status: 502,
            body: None,
        };
        assert_eq!(err.to_string(), "Upstream returned HTTP 502");

        let err = ToolError::InvalidEnum {
            param: "time_interval".to_string(),
            value: "2w".to_string(),
            accepted: vec!["1h".to_string(), "24h".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid value `2w` for `time_interval`, expected one of: 1h, 24h"
        );
    }

    #[test]
    fn test_validation_kinds() {
        assert!(ToolError::MissingParameter("pool_address".to_string()).is_validation());
        assert!(ToolError::InvalidRange {
            param: "size".to_string(),
            reason: "must be between 1 and 100, got 0".to_string(),
        }
        .is_validation());
        assert!(!ToolError::SchemaMismatch {
            path: "fee".to_string(),
            message: "missing field `fee`".to_string(),
        }
        .is_validation());
    }
}
