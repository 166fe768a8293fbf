//! Status code translation.
//!
//! The native library defines a flat numeric code space. [`ErrorTranslator`]
//! indexes a static table of [`ErrorDescriptor`]s and maps every code, known
//! or not, to exactly one [`ErrorKind`].

use std::collections::HashMap;
use std::fmt;

use crate::codes::SDK_ERRORS;
use crate::types::StatusCode;

/// One row of an error table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub code: i32,
    pub name: &'static str,
    pub message: &'static str,
}

impl ErrorDescriptor {
    pub const fn new(code: i32, name: &'static str, message: &'static str) -> Self {
        Self {
            code,
            name,
            message,
        }
    }
}

/// Typed classification of a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The code is present in the table.
    Known {
        code: StatusCode,
        name: &'static str,
        message: &'static str,
    },
    /// The code is absent from the table; the raw value is preserved.
    Unidentified(StatusCode),
}

impl ErrorKind {
    pub fn code(&self) -> StatusCode {
        match self {
            ErrorKind::Known { code, .. } => *code,
            ErrorKind::Unidentified(code) => *code,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Known { name, .. } => name,
            ErrorKind::Unidentified(_) => "Unidentified",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::Known { message, .. } => message,
            ErrorKind::Unidentified(_) => UNIDENTIFIED_MESSAGE,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, ErrorKind::Known { .. })
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Known {
                code,
                name,
                message,
            } => write!(f, "{name} ({code}): {message}"),
            ErrorKind::Unidentified(code) => write!(f, "Unidentified ({code})"),
        }
    }
}

const UNIDENTIFIED_MESSAGE: &str = "Unidentified error";

/// Total, side-effect-free lookup from status code to [`ErrorKind`].
#[derive(Debug, Clone)]
pub struct ErrorTranslator {
    index: HashMap<i32, &'static ErrorDescriptor>,
}

impl ErrorTranslator {
    /// Index `table`. On duplicate codes the first row wins.
    pub fn new(table: &'static [ErrorDescriptor]) -> Self {
        let mut index: HashMap<i32, &'static ErrorDescriptor> =
            HashMap::with_capacity(table.len());
        for descriptor in table {
            if let Some(existing) = index.get(&descriptor.code) {
                tracing::warn!(
                    code = descriptor.code,
                    kept = existing.name,
                    ignored = descriptor.name,
                    "duplicate status code in error table"
                );
                continue;
            }
            index.insert(descriptor.code, descriptor);
        }
        Self { index }
    }

    /// Translator over the built-in SDK table.
    pub fn sdk() -> Self {
        Self::new(SDK_ERRORS)
    }

    pub fn translate(&self, code: StatusCode) -> ErrorKind {
        match self.index.get(&code.as_raw()) {
            Some(d) => ErrorKind::Known {
                code,
                name: d.name,
                message: d.message,
            },
            None => ErrorKind::Unidentified(code),
        }
    }

    /// The human-readable template for `code`.
    pub fn message(&self, code: StatusCode) -> &'static str {
        self.translate(code).message()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl Default for ErrorTranslator {
    fn default() -> Self {
        Self::sdk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    static TEST_TABLE: &[ErrorDescriptor] = &[
        ErrorDescriptor::new(0, "Success", "Success"),
        ErrorDescriptor::new(1002, "ConnectionError", "Error with Connection"),
        ErrorDescriptor::new(1004, "InvalidConfiguration", "Invalid Configuration"),
        ErrorDescriptor::new(1004, "Shadowed", "never visible"),
    ];

    #[test]
    fn test_known_code() {
        let translator = ErrorTranslator::new(TEST_TABLE);
        let kind = translator.translate(StatusCode(1002));
        assert_eq!(kind.name(), "ConnectionError");
        assert_eq!(kind.code(), StatusCode(1002));
        assert!(kind.is_known());
        assert_eq!(kind.to_string(), "ConnectionError (1002): Error with Connection");
    }

    #[test]
    fn test_absent_code_is_unidentified() {
        let translator = ErrorTranslator::new(TEST_TABLE);
        let kind = translator.translate(StatusCode(4242));
        assert_eq!(kind, ErrorKind::Unidentified(StatusCode(4242)));
        assert_eq!(translator.message(StatusCode(4242)), "Unidentified error");
        assert_eq!(kind.to_string(), "Unidentified (4242)");
    }

    #[test]
    fn test_duplicate_code_first_wins() {
        let translator = ErrorTranslator::new(TEST_TABLE);
        assert_eq!(translator.len(), 3);
        assert_eq!(translator.translate(StatusCode(1004)).name(), "InvalidConfiguration");
    }

    #[test]
    fn test_sdk_table_families() {
        let translator = ErrorTranslator::sdk();
        assert_eq!(translator.translate(StatusCode(113)).name(), "CommonInvalidStructure");
        assert_eq!(translator.translate(StatusCode(212)).name(), "WalletItemNotFound");
        assert_eq!(translator.translate(StatusCode(307)).name(), "PoolLedgerTimeout");
        assert_eq!(translator.translate(StatusCode(1002)).name(), "ConnectionError");
        assert_eq!(translator.translate(StatusCode(1038)).name(), "CallbackTimeout");
    }

    proptest! {
        #[test]
        fn translate_is_total_and_preserves_code(raw in any::<i32>()) {
            let translator = ErrorTranslator::sdk();
            let kind = translator.translate(StatusCode(raw));
            prop_assert_eq!(kind.code(), StatusCode(raw));
            prop_assert!(!kind.name().is_empty());
            prop_assert!(!kind.message().is_empty());
        }
    }
}
