//! # Callbridge Core
//!
//! Correlation primitives for bridging a callback-driven native library to
//! single-assignment results.
//!
//! A native call is fired with a correlation id and answered later, on an
//! arbitrary thread, by a callback carrying that id, a status code and a
//! payload. This crate owns the pieces in between; it spawns no threads and
//! performs no I/O.
//!
//! ## Key Types
//!
//! - [`HandleAllocator`] - race-free correlation id issue
//! - [`CorrelationRegistry`] - concurrent map of pending calls
//! - [`Continuation`] - result cell plus registration-time decoder
//! - [`ErrorTranslator`] - total map from [`StatusCode`] to [`ErrorKind`]
//! - [`ResultDispatcher`] - the single entry point for every callback
//!
//! ## Flow
//!
//! ```text
//! call site                   native layer                 callback thread
//!   |-- allocate + register -->|                               |
//!   |-- nativeFn(id, .., cb) ->|                               |
//!   |<- immediate status ------|                               |
//!   |                          |-- cb(id, status, payload) --->|
//!   |                          |            dispatch: take(id), decode | translate
//! ```

pub mod allocator;
pub mod codes;
pub mod continuation;
pub mod details;
pub mod dispatcher;
pub mod error;
pub mod payload;
pub mod registry;
pub mod translate;
pub mod types;

pub use allocator::HandleAllocator;
pub use codes::SDK_ERRORS;
pub use continuation::{Continuation, Delivery};
pub use details::{ErrorDetails, ErrorDetailsSource};
pub use dispatcher::{ResultDispatcher, ViolationPolicy};
pub use error::{CallError, DecodeError, ProtocolViolation, Result};
pub use payload::{Decode, Json, NativePayload, NativeValue};
pub use registry::{CorrelationRegistry, PendingEntry, DEFAULT_ABANDONED_CAPACITY};
pub use translate::{ErrorDescriptor, ErrorKind, ErrorTranslator};
pub use types::{CorrelationId, StatusCode};
