//! # Callbridge Testkit
//!
//! Testing utilities for the callbridge correlation layer.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fake native layer**: a scriptable stand-in for the native library that
//!   accepts or rejects calls and fires callbacks from its own threads
//! - **Generators**: Proptest strategies for status codes and payloads
//! - **Fixtures**: a broker wired to the fake, plus tracing setup
//!
//! ## Fake Native Layer
//!
//! ```rust
//! use callbridge_core::NativePayload;
//! use callbridge_testkit::{Script, TestBridge};
//!
//! let bridge = TestBridge::new().unwrap();
//! let pending = bridge
//!     .broker
//!     .call::<String, _>("get_did", |id, _| {
//!         bridge.native.submit(id, Script::ok(NativePayload::string("did:sov:1")))
//!     })
//!     .unwrap();
//! assert_eq!(pending.blocking_wait().unwrap(), "did:sov:1");
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use callbridge_testkit::generators::any_code;
//!
//! proptest! {
//!     #[test]
//!     fn every_code_translates(code in any_code()) {
//!         let _ = callbridge_core::ErrorTranslator::sdk().translate(code);
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod native;

pub use fixtures::{init_tracing, TestBridge};
pub use native::{set_current_error, FakeErrorDetails, FakeNative, FakeNativeConfig, Script};
