//! Error types for the correlation layer.

use std::time::Duration;

use thiserror::Error;

use crate::details::ErrorDetails;
use crate::translate::ErrorKind;
use crate::types::{CorrelationId, StatusCode};

/// A success payload the operation's decoder could not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("expected {expected} callback argument(s), got {got}")]
    Arity { expected: usize, got: usize },

    #[error("argument {position}: expected {expected}, got {got}")]
    Type {
        position: usize,
        expected: &'static str,
        got: &'static str,
    },

    #[error("argument {position}: unexpected null pointer")]
    Null { position: usize },

    #[error("invalid json: {0}")]
    Json(String),

    #[error("{0}")]
    Custom(String),
}

/// The failure a caller observes for one call.
#[derive(Debug, Clone, Error)]
pub enum CallError {
    /// The native layer reported a non-success status, either as the
    /// immediate return value or through the callback.
    #[error("{kind}")]
    Native {
        kind: ErrorKind,
        details: Option<ErrorDetails>,
    },

    /// Success status, but the payload did not decode.
    #[error("call {id}: failed to decode result: {source}")]
    Decode {
        id: CorrelationId,
        #[source]
        source: DecodeError,
    },

    /// No callback arrived within the caller's deadline.
    #[error("call {id}: no callback after {after:?}")]
    Timeout { id: CorrelationId, after: Duration },

    /// The continuation was released without a result, e.g. on shutdown.
    #[error("call {id}: abandoned before a result was delivered")]
    Abandoned { id: CorrelationId },
}

impl CallError {
    /// The native status code, when the failure came from the native layer.
    pub fn code(&self) -> Option<StatusCode> {
        match self {
            CallError::Native { kind, .. } => Some(kind.code()),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<&ErrorKind> {
        match self {
            CallError::Native { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn details(&self) -> Option<&ErrorDetails> {
        match self {
            CallError::Native { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// Whether the status code was absent from the translation table.
    pub fn is_unidentified(&self) -> bool {
        matches!(self.kind(), Some(ErrorKind::Unidentified(_)))
    }
}

/// A callback that cannot be matched to a pending call.
///
/// Never delivered through a continuation: it signals a defect in the native
/// layer or in this crate, and there is no caller to hand it to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// The id was never registered, or its entry was already consumed.
    #[error("callback for unknown or already consumed id {id} (status {code})")]
    UnknownId { id: CorrelationId, code: StatusCode },

    /// The caller gave up on the id before the callback arrived.
    #[error("late callback for abandoned id {id} (status {code})")]
    LateAfterAbandon { id: CorrelationId, code: StatusCode },
}

impl ProtocolViolation {
    pub fn id(&self) -> CorrelationId {
        match self {
            ProtocolViolation::UnknownId { id, .. }
            | ProtocolViolation::LateAfterAbandon { id, .. } => *id,
        }
    }

    /// Late callbacks are an expected consequence of timeouts, not a defect.
    pub fn is_defect(&self) -> bool {
        matches!(self, ProtocolViolation::UnknownId { .. })
    }
}

/// Result type for call outcomes.
pub type Result<T> = std::result::Result<T, CallError>;
