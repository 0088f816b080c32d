//! Error types shared by the concierge services.
//!
//! Every surface that reports failures to the outside world (CLI output,
//! chat responses, tool payloads) goes through [`sanitize_error_message`]
//! so credentials and sensitive paths never leak into user-visible text.

use thiserror::Error;

/// Main error type for concierge operations
#[derive(Debug, Error)]
pub enum ConciergeError {
    #[error("Tool execution failed: {message}")]
    ToolExecutionFailed { message: String },

    #[error("LLM provider error: {message}")]
    LlmError { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),

    #[error("Tool error: {0}")]
    ToolError(#[from] crate::tools::ToolError),
}

impl ConciergeError {
    /// Create tool execution error
    pub fn tool_execution_failed<S: Into<String>>(message: S) -> Self {
        Self::ToolExecutionFailed {
            message: message.into(),
        }
    }

    /// Create LLM error
    pub fn llm_error<S: Into<String>>(message: S) -> Self {
        Self::LlmError {
            message: message.into(),
        }
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create internal error
    pub fn internal_error<S: Into<String>>(message: S) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// Sanitize error messages to prevent sensitive data leakage
///
/// Applied wherever an internal error is rendered into text that leaves the
/// process: tool failure payloads, chat error logs, CLI output. Provider
/// errors can embed request URLs that carry API keys as query parameters.
pub fn sanitize_error_message(message: &str) -> String {
    // Remove potential sensitive patterns
    let mut sanitized = message.to_string();

    // Remove common secret patterns
    sanitized = regex::Regex::new(r"(?i)(password|token|key|secret)[=:]\s*\S+")
        .unwrap()
        .replace_all(&sanitized, "${1}=***")
        .to_string();

    // Remove potential file paths that might contain sensitive info
    sanitized =
        regex::Regex::new(r"/[a-zA-Z0-9._/-]+/(secrets?|\.ssh|\.aws|\.config)/[a-zA-Z0-9._/-]+")
            .unwrap()
            .replace_all(&sanitized, "/***REDACTED***/")
            .to_string();

    // Truncate very long messages - ensure total length is <= 500
    if sanitized.len() > 500 {
        let truncate_suffix = "...[truncated]";
        // The byte cap can land inside a multi-byte character; back up to a
        // char boundary before slicing
        let mut cut = 500 - truncate_suffix.len();
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized = format!("{}{}", &sanitized[..cut], truncate_suffix);
    }

    sanitized
}

/// Result type for concierge operations
pub type ConciergeResult<T> = Result<T, ConciergeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_execution_failed_constructor() {
        let error = ConciergeError::tool_execution_failed("test error");
        assert!(matches!(error, ConciergeError::ToolExecutionFailed { .. }));
        assert_eq!(error.to_string(), "Tool execution failed: test error");
    }

    #[test]
    fn test_llm_error_constructor() {
        let error = ConciergeError::llm_error("model timeout");
        assert!(matches!(error, ConciergeError::LlmError { .. }));
        assert_eq!(error.to_string(), "LLM provider error: model timeout");
    }

    #[test]
    fn test_invalid_input_constructor() {
        let error = ConciergeError::invalid_input("missing field");
        assert!(matches!(error, ConciergeError::InvalidInput { .. }));
        assert_eq!(error.to_string(), "Invalid input: missing field");
    }

    #[test]
    fn test_internal_error_constructor() {
        let error = ConciergeError::internal_error("unexpected state");
        assert!(matches!(error, ConciergeError::InternalError { .. }));
        assert_eq!(error.to_string(), "Internal error: unexpected state");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let error = ConciergeError::from(io);
        assert!(matches!(error, ConciergeError::Io(_)));
        assert!(error.to_string().contains("pipe closed"));
    }

    // ========== Tests for Sanitization ==========

    #[test]
    fn test_error_message_sanitization() {
        let sanitized =
            sanitize_error_message("Failed to authenticate: password=secret123 token=abc456");

        assert!(!sanitized.contains("secret123"));
        assert!(!sanitized.contains("abc456"));
        assert!(sanitized.contains("password=***"));
        assert!(sanitized.contains("token=***"));
    }

    #[test]
    fn test_api_key_in_url_redaction() {
        let message =
            "request failed: https://generativelanguage.googleapis.com/v1beta/models/x?key=AIzaFakeKey123";
        let sanitized = sanitize_error_message(message);

        assert!(!sanitized.contains("AIzaFakeKey123"));
        assert!(sanitized.contains("key=***"));
    }

    #[test]
    fn test_long_message_truncation() {
        let long_message = "x".repeat(600);
        let sanitized = sanitize_error_message(&long_message);

        assert!(sanitized.len() <= 500);
        assert!(sanitized.ends_with("...[truncated]"));
    }

    #[test]
    fn test_truncate_multibyte_message_at_char_boundary() {
        // 2-byte characters straddle the byte cap
        let message = format!("Invalid target currency: {}", "é".repeat(300));
        let sanitized = sanitize_error_message(&message);

        assert!(sanitized.len() <= 500);
        assert!(sanitized.starts_with("Invalid target currency: é"));
        assert!(sanitized.ends_with("...[truncated]"));
    }

    #[test]
    fn test_truncate_wide_char_message() {
        let sanitized = sanitize_error_message(&"🦀".repeat(200));

        assert!(sanitized.len() <= 500);
        assert!(sanitized.starts_with('🦀'));
        assert!(sanitized.ends_with("...[truncated]"));
    }

    #[test]
    fn test_file_path_redaction() {
        let message = "Failed to read /home/user/.ssh/id_rsa and /etc/secrets/api.key";
        let sanitized = sanitize_error_message(message);

        assert!(sanitized.contains("/***REDACTED***/"));
        assert!(!sanitized.contains("/home/user/.ssh/id_rsa"));
    }

    #[test]
    fn test_sanitize_multiple_secrets() {
        let message = "Auth failed: password=pass1 api_key=key123 secret=hidden token=tok456";
        let sanitized = sanitize_error_message(message);

        assert!(!sanitized.contains("pass1"));
        assert!(!sanitized.contains("key123"));
        assert!(!sanitized.contains("hidden"));
        assert!(!sanitized.contains("tok456"));
        assert!(sanitized.contains("password=***"));
        assert!(sanitized.contains("key=***"));
    }

    #[test]
    fn test_sanitize_case_insensitive() {
        let message = "PASSWORD=secret123 Token=abc Key=xyz";
        let sanitized = sanitize_error_message(message);

        assert!(!sanitized.contains("secret123"));
        assert!(!sanitized.contains("abc"));
        assert!(!sanitized.contains("xyz"));
    }

    #[test]
    fn test_sanitize_with_colons() {
        let message = "password: secret123 token: abc456";
        let sanitized = sanitize_error_message(message);

        assert!(!sanitized.contains("secret123"));
        assert!(!sanitized.contains("abc456"));
    }

    #[test]
    fn test_sanitize_empty_message() {
        let sanitized = sanitize_error_message("");
        assert_eq!(sanitized, "");
    }

    #[test]
    fn test_sanitize_exactly_500_chars() {
        let message = "x".repeat(500);
        let sanitized = sanitize_error_message(&message);
        assert_eq!(sanitized.len(), 500);
        assert!(!sanitized.contains("truncated"));
    }

    #[test]
    fn test_sanitize_aws_config_paths() {
        let message = "Failed to read /home/user/.aws/credentials";
        let sanitized = sanitize_error_message(message);

        assert!(sanitized.contains("/***REDACTED***/"));
        assert!(!sanitized.contains(".aws/credentials"));
    }
}
