//! The call broker: one correlation service per native binding instance.
//!
//! The broker owns the allocator, the registry, and the dispatcher, and runs
//! the call-site protocol for every wrapped operation:
//!
//! 1. build a continuation around the operation's decoder
//! 2. allocate an id and register the continuation under it
//! 3. invoke the native function with the id and the dispatcher
//! 4. on an immediate non-success status, deregister and fail synchronously;
//!    otherwise hand back a [`Pending`] that the callback will resolve

use std::sync::Arc;

use tokio::sync::oneshot;

use callbridge_core::{
    CallError, Continuation, CorrelationId, CorrelationRegistry, Decode, DecodeError, Delivery,
    ErrorDetailsSource, ErrorTranslator, HandleAllocator, NativePayload, ResultDispatcher,
    StatusCode,
};

use crate::config::BridgeConfig;
use crate::pending::Pending;

/// Builder for a [`CallBroker`].
pub struct CallBrokerBuilder {
    config: BridgeConfig,
    translator: ErrorTranslator,
    details: Option<Arc<dyn ErrorDetailsSource>>,
}

impl CallBrokerBuilder {
    /// Translate status codes with `translator` instead of the SDK table.
    pub fn translator(mut self, translator: ErrorTranslator) -> Self {
        self.translator = translator;
        self
    }

    /// Query `source` for extended details on every failure. Ignored when
    /// `capture_error_details` is off in the config.
    pub fn error_details(mut self, source: Arc<dyn ErrorDetailsSource>) -> Self {
        self.details = Some(source);
        self
    }

    pub fn build(self) -> CallBroker {
        let registry = Arc::new(CorrelationRegistry::with_abandoned_capacity(
            self.config.abandoned_capacity,
        ));
        let mut dispatcher = ResultDispatcher::new(Arc::clone(&registry), Arc::new(self.translator))
            .with_policy(self.config.violation_policy);
        if self.config.capture_error_details {
            if let Some(source) = self.details {
                dispatcher = dispatcher.with_details(source);
            }
        }

        CallBroker {
            allocator: HandleAllocator::new(),
            registry,
            dispatcher,
            config: self.config,
        }
    }
}

/// Instance-scoped correlation service.
///
/// Construct one per native binding and pass it to the code that wraps the
/// binding's operations. Every method takes `&self`; share across threads
/// behind an `Arc`.
pub struct CallBroker {
    allocator: HandleAllocator,
    registry: Arc<CorrelationRegistry>,
    dispatcher: ResultDispatcher,
    config: BridgeConfig,
}

impl CallBroker {
    /// A broker over the built-in SDK error table.
    pub fn new(config: BridgeConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: BridgeConfig) -> CallBrokerBuilder {
        CallBrokerBuilder {
            config,
            translator: ErrorTranslator::sdk(),
            details: None,
        }
    }

    /// The dispatcher native callbacks must be routed to.
    pub fn dispatcher(&self) -> &ResultDispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Run one native call whose success payload decodes as `T`.
    ///
    /// `invoke` receives the call's id and the dispatcher, performs the
    /// native call, and returns its immediate status code.
    pub fn call<T, F>(&self, label: &'static str, invoke: F) -> Result<Pending<T>, CallError>
    where
        T: Decode,
        F: FnOnce(CorrelationId, &ResultDispatcher) -> StatusCode,
    {
        self.call_with(label, T::decode, invoke)
    }

    /// Like [`call`](Self::call) with an explicit decoder.
    pub fn call_with<T, D, F>(
        &self,
        label: &'static str,
        decoder: D,
        invoke: F,
    ) -> Result<Pending<T>, CallError>
    where
        T: Send + 'static,
        D: FnOnce(NativePayload) -> Result<T, DecodeError> + Send + Sync + 'static,
        F: FnOnce(CorrelationId, &ResultDispatcher) -> StatusCode,
    {
        let (tx, rx) = oneshot::channel();
        let continuation = Continuation::with_decoder(label, decoder, move |outcome| {
            // The receiver may already be gone; the result is then discarded.
            let _ = tx.send(outcome);
        });
        let id = self.registry.register_fresh(&self.allocator, continuation);

        let status = invoke(id, &self.dispatcher);
        if !status.is_success() {
            let error = self.dispatcher.failure(status);
            if self.registry.take(id).is_none() {
                tracing::warn!(%id, %status, label, "native layer rejected a call it had already answered");
            }
            tracing::warn!(%id, %status, label, "native call rejected: {error}");
            return Err(error);
        }

        Ok(Pending::new(
            id,
            rx,
            Arc::downgrade(&self.registry),
            self.config.call_timeout(),
        ))
    }

    /// Calls registered and not yet resolved.
    pub fn pending_count(&self) -> usize {
        self.registry.len()
    }

    /// Total ids issued by this broker.
    pub fn issued(&self) -> u64 {
        self.allocator.issued()
    }

    /// Fail every pending call with [`CallError::Abandoned`].
    ///
    /// The ids are remembered as abandoned, so callbacks that still arrive
    /// are logged as late. Returns the number of calls released.
    pub fn shutdown(&self) -> usize {
        let entries = self.registry.abandon_all();
        let released = entries.len();
        for entry in entries {
            let id = entry.id;
            entry
                .continuation
                .resolve(id, Delivery::Failure(CallError::Abandoned { id }));
        }
        if released > 0 {
            tracing::warn!(released, "broker shut down with calls in flight");
        }
        released
    }
}

impl Default for CallBroker {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

impl std::fmt::Debug for CallBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallBroker")
            .field("issued", &self.allocator.issued())
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
