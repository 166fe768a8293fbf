//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use callbridge::{BridgeConfig, CallBroker};
use callbridge_core::{CorrelationId, ViolationPolicy};

use crate::native::{FakeErrorDetails, FakeNative, FakeNativeConfig};

/// Install a test-writer tracing subscriber. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("callbridge=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// A broker wired to a fake native layer.
pub struct TestBridge {
    pub broker: Arc<CallBroker>,
    pub native: FakeNative,
}

impl TestBridge {
    /// Log-only violations, no call timeout, details from the fake.
    pub fn new() -> io::Result<Self> {
        Self::with_config(
            BridgeConfig::default().with_violation_policy(ViolationPolicy::Log),
            FakeNativeConfig::default(),
        )
    }

    /// A bridge whose calls time out after `after`.
    pub fn with_timeout(after: Duration) -> io::Result<Self> {
        Self::with_config(
            BridgeConfig::default()
                .with_violation_policy(ViolationPolicy::Log)
                .with_call_timeout(after),
            FakeNativeConfig::default(),
        )
    }

    pub fn with_config(config: BridgeConfig, native: FakeNativeConfig) -> io::Result<Self> {
        init_tracing();
        let broker = Arc::new(
            CallBroker::builder(config)
                .error_details(Arc::new(FakeErrorDetails))
                .build(),
        );
        let native = FakeNative::with_config(broker.dispatcher().clone(), native)?;
        Ok(Self { broker, native })
    }

    /// Issue `count` calls that are rejected immediately, consuming ids
    /// `1..=count` without leaving anything registered.
    pub fn burn_ids(&self, count: usize) -> Vec<CorrelationId> {
        (0..count)
            .filter_map(|_| {
                let mut seen = None;
                let _ = self.broker.call::<(), _>("burn", |id, _| {
                    seen = Some(id);
                    callbridge_core::StatusCode(1000)
                });
                seen
            })
            .collect()
    }
}
