//! Extended error information reported by the native layer.
//!
//! After a failure the native library can describe the most recent error on
//! the calling thread as JSON. Details are best-effort: anything missing or
//! malformed yields `None` rather than a second error.

use serde::{Deserialize, Serialize};

/// Parsed form of the native "current error" JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Short error name as reported by the library.
    #[serde(default)]
    pub error: Option<String>,
    /// Full human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub cause: Option<String>,
    #[serde(default)]
    pub backtrace: Option<String>,
}

impl ErrorDetails {
    /// Parse the native JSON; `None` on malformed input or an empty object.
    pub fn from_json(raw: &str) -> Option<Self> {
        match serde_json::from_str::<ErrorDetails>(raw) {
            Ok(details) if details != ErrorDetails::default() => Some(details),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed native error details");
                None
            }
        }
    }
}

/// Query for the native layer's most recent error on the current thread.
pub trait ErrorDetailsSource: Send + Sync {
    /// Raw JSON, or `None` if the library has nothing recorded.
    fn current_error(&self) -> Option<String>;

    /// Fetch and parse in one step.
    fn details(&self) -> Option<ErrorDetails> {
        self.current_error()
            .as_deref()
            .and_then(ErrorDetails::from_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<&'static str>);

    impl ErrorDetailsSource for Fixed {
        fn current_error(&self) -> Option<String> {
            self.0.map(String::from)
        }
    }

    #[test]
    fn test_parse_full_details() {
        let raw = r#"{"error":"WalletItemNotFound","message":"Item not found","cause":"no row","backtrace":"bt"}"#;
        let details = ErrorDetails::from_json(raw).unwrap();
        assert_eq!(details.error.as_deref(), Some("WalletItemNotFound"));
        assert_eq!(details.cause.as_deref(), Some("no row"));
    }

    #[test]
    fn test_partial_details() {
        let details = ErrorDetails::from_json(r#"{"message":"boom"}"#).unwrap();
        assert_eq!(details.message.as_deref(), Some("boom"));
        assert_eq!(details.backtrace, None);
    }

    #[test]
    fn test_malformed_or_empty_is_none() {
        assert_eq!(ErrorDetails::from_json("not json"), None);
        assert_eq!(ErrorDetails::from_json("{}"), None);
    }

    #[test]
    fn test_source_details() {
        assert!(Fixed(Some(r#"{"error":"x"}"#)).details().is_some());
        assert!(Fixed(None).details().is_none());
    }
}
