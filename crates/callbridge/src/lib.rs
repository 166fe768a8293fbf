//! # Callbridge
//!
//! Future-based calls over a callback-driven native library.
//!
//! ## Overview
//!
//! Native functions in the wrapped library return an immediate status code
//! and deliver their real result later through a C callback. A
//! [`CallBroker`] turns each such call into a [`Pending`] value:
//!
//! - an immediate non-success status fails the call synchronously and the
//!   registration is removed
//! - otherwise the callback, on whatever thread the library uses, resolves
//!   the `Pending` with a decoded value or a typed [`CallError`]
//!
//! ## Usage
//!
//! ```rust,no_run
//! use callbridge::{BridgeConfig, CallBroker, StatusCode};
//!
//! async fn example() -> Result<(), callbridge::CallError> {
//!     let broker = CallBroker::new(BridgeConfig::default());
//!
//!     let pending = broker.call::<String, _>("create_schema", |id, _dispatcher| {
//!         // unsafe { ffi_create_schema(id.as_raw(), name.as_ptr(), Some(callbridge::ffi::cb_string)) }
//!         let _ = id;
//!         StatusCode::SUCCESS
//!     })?;
//!
//!     let schema_id = pending.wait().await?;
//!     println!("created {schema_id}");
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `callbridge::correlation` - the correlation primitives crate

pub mod broker;
pub mod config;
pub mod error;
pub mod ffi;
pub mod pending;

pub use callbridge_core as correlation;

pub use broker::{CallBroker, CallBrokerBuilder};
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use pending::Pending;

pub use callbridge_core::{
    CallError, CorrelationId, Decode, DecodeError, ErrorDetails, ErrorDetailsSource, ErrorKind,
    ErrorTranslator, Json, NativePayload, NativeValue, ProtocolViolation, ResultDispatcher,
    StatusCode, ViolationPolicy,
};
