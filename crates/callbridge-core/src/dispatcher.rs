//! The single fan-in point for native callbacks.
//!
//! Every callback, whatever operation it belongs to, ends in
//! [`ResultDispatcher::dispatch`]: the entry is taken out of the registry,
//! the status code decides between decoding the payload and translating a
//! failure, and the continuation is resolved outside of any lock.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::continuation::Delivery;
use crate::details::ErrorDetailsSource;
use crate::error::{CallError, ProtocolViolation};
use crate::payload::NativePayload;
use crate::registry::CorrelationRegistry;
use crate::translate::ErrorTranslator;
use crate::types::{CorrelationId, StatusCode};

/// How a callback for an unknown id is escalated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationPolicy {
    /// Panic on the dispatching thread.
    Panic,
    /// Emit an `error!` event and drop the callback.
    Log,
}

impl Default for ViolationPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            ViolationPolicy::Panic
        } else {
            ViolationPolicy::Log
        }
    }
}

/// Resolves continuations from `(id, status, payload)` callbacks.
#[derive(Clone)]
pub struct ResultDispatcher {
    registry: Arc<CorrelationRegistry>,
    translator: Arc<ErrorTranslator>,
    details: Option<Arc<dyn ErrorDetailsSource>>,
    policy: ViolationPolicy,
}

impl ResultDispatcher {
    pub fn new(registry: Arc<CorrelationRegistry>, translator: Arc<ErrorTranslator>) -> Self {
        Self {
            registry,
            translator,
            details: None,
            policy: ViolationPolicy::default(),
        }
    }

    /// Capture native error details for every failure.
    pub fn with_details(mut self, source: Arc<dyn ErrorDetailsSource>) -> Self {
        self.details = Some(source);
        self
    }

    pub fn with_policy(mut self, policy: ViolationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn registry(&self) -> &Arc<CorrelationRegistry> {
        &self.registry
    }

    pub fn translator(&self) -> &ErrorTranslator {
        &self.translator
    }

    pub fn policy(&self) -> ViolationPolicy {
        self.policy
    }

    /// Deliver one callback.
    ///
    /// Returns the violation when the id is not pending. Under
    /// [`ViolationPolicy::Panic`] an unknown id panics instead of returning.
    pub fn dispatch(
        &self,
        id: CorrelationId,
        code: StatusCode,
        payload: NativePayload,
    ) -> Result<(), ProtocolViolation> {
        let Some(entry) = self.registry.take(id) else {
            let violation = if self.registry.take_abandoned(id) {
                ProtocolViolation::LateAfterAbandon { id, code }
            } else {
                ProtocolViolation::UnknownId { id, code }
            };
            self.escalate(&violation);
            return Err(violation);
        };

        tracing::debug!(
            %id,
            %code,
            label = entry.continuation.label(),
            elapsed_us = entry.registered_at.elapsed().as_micros() as u64,
            "dispatching callback"
        );

        let delivery = if code.is_success() {
            Delivery::Payload(payload)
        } else {
            Delivery::Failure(self.failure(code))
        };
        entry.continuation.resolve(id, delivery);
        Ok(())
    }

    /// The error a caller observes for a non-success `code`.
    pub fn failure(&self, code: StatusCode) -> CallError {
        CallError::Native {
            kind: self.translator.translate(code),
            details: self.details.as_ref().and_then(|source| source.details()),
        }
    }

    fn escalate(&self, violation: &ProtocolViolation) {
        if !violation.is_defect() {
            tracing::warn!(id = %violation.id(), "{violation}");
            return;
        }
        match self.policy {
            ViolationPolicy::Panic => panic!("protocol violation: {violation}"),
            ViolationPolicy::Log => tracing::error!(id = %violation.id(), "protocol violation: {violation}"),
        }
    }
}

impl std::fmt::Debug for ResultDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultDispatcher")
            .field("registry", &self.registry)
            .field("policy", &self.policy)
            .field("details", &self.details.is_some())
            .finish()
    }
}
