//! Bridge configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use callbridge_core::{ViolationPolicy, DEFAULT_ABANDONED_CAPACITY};

use crate::error::Result;

/// Configuration for a [`CallBroker`](crate::CallBroker).
///
/// Deserializable from the same kind of JSON runtime-config string the native
/// library accepts; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Deadline applied by [`Pending::wait`](crate::Pending::wait).
    /// `None` waits for the callback indefinitely.
    pub call_timeout_ms: Option<u64>,
    /// Escalation for callbacks with unknown ids.
    pub violation_policy: ViolationPolicy,
    /// How many abandoned ids are remembered to recognise late callbacks.
    pub abandoned_capacity: usize,
    /// Whether failures query the native layer for extended error details.
    pub capture_error_details: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: None,
            violation_policy: ViolationPolicy::default(),
            abandoned_capacity: DEFAULT_ABANDONED_CAPACITY,
            capture_error_details: true,
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON runtime-config string.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_violation_policy(mut self, policy: ViolationPolicy) -> Self {
        self.violation_policy = policy;
        self
    }
}
