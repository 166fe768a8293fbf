//! Error types for the bridge facade.

use thiserror::Error;

/// Errors raised while setting the bridge up. Call outcomes use
/// [`CallError`](callbridge_core::CallError) instead.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Runtime configuration JSON could not be parsed.
    #[error("invalid bridge config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// A dispatcher is already installed on the C callback route.
    #[error("a dispatcher is already installed on the ffi callback route")]
    AlreadyInstalled,
}

/// Result type for bridge setup.
pub type Result<T> = std::result::Result<T, BridgeError>;
