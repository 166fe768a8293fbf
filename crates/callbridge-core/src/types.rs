//! Strong type definitions for the correlation layer.
//!
//! Both identifiers that cross the native boundary are `i32` on the wire and
//! newtypes here, so a status code can never be passed where a handle is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier correlating a native call with its eventual callback.
///
/// Unique among currently pending calls. Zero is the native library's
/// invalid command handle and is never issued.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CorrelationId(pub i32);

impl CorrelationId {
    /// The reserved invalid handle.
    pub const INVALID: Self = Self(0);

    /// Wrap a raw wire handle.
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// The raw wire handle passed to the native function.
    pub const fn as_raw(&self) -> i32 {
        self.0
    }

    /// Whether this id could have been issued by an allocator.
    pub const fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Debug for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CorrelationId({})", self.0)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i32> for CorrelationId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

/// Numeric outcome shared by a native function's immediate return value and
/// the status argument of its callback.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatusCode(pub i32);

impl StatusCode {
    /// The success sentinel.
    pub const SUCCESS: Self = Self(0);

    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn as_raw(&self) -> i32 {
        self.0
    }

    pub const fn is_success(&self) -> bool {
        self.0 == Self::SUCCESS.0
    }
}

impl fmt::Debug for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatusCode({})", self.0)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for StatusCode {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl From<StatusCode> for i32 {
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_handle_is_not_valid() {
        assert!(!CorrelationId::INVALID.is_valid());
        assert!(!CorrelationId::from_raw(-5).is_valid());
        assert!(CorrelationId::from_raw(1).is_valid());
    }

    #[test]
    fn test_success_sentinel() {
        assert!(StatusCode::SUCCESS.is_success());
        assert!(!StatusCode::from(1002).is_success());
        assert_eq!(i32::from(StatusCode::from(1004)), 1004);
    }

    #[test]
    fn test_display_and_debug() {
        assert_eq!(format!("{}", CorrelationId(7)), "#7");
        assert_eq!(format!("{:?}", CorrelationId(7)), "CorrelationId(7)");
        assert_eq!(format!("{}", StatusCode(212)), "212");
    }
}
