//! Single-assignment continuations.
//!
//! A [`Continuation`] owns a boxed "decode and fulfill" closure built at
//! registration time, when the result type is still statically known. The
//! dispatcher never needs to know that type. Resolving consumes the
//! continuation, so it can be fulfilled at most once.

use crate::error::{CallError, DecodeError};
use crate::payload::{Decode, NativePayload};
use crate::types::CorrelationId;

/// What the dispatcher hands to a continuation.
#[derive(Debug)]
pub enum Delivery {
    /// Success status; the payload still has to be decoded.
    Payload(NativePayload),
    /// A terminal failure.
    Failure(CallError),
}

// Sync so the registry map can be shared across callback threads.
type Resolve = Box<dyn FnOnce(CorrelationId, Delivery) + Send + Sync>;

/// A pending call's result cell together with its decoder.
pub struct Continuation {
    label: &'static str,
    resolve: Resolve,
}

impl Continuation {
    /// Build from a raw resolution closure.
    pub fn new<F>(label: &'static str, resolve: F) -> Self
    where
        F: FnOnce(CorrelationId, Delivery) + Send + Sync + 'static,
    {
        Self {
            label,
            resolve: Box::new(resolve),
        }
    }

    /// Decode success payloads with `decoder`, then hand the outcome to
    /// `fulfill`. Decoder failures become [`CallError::Decode`].
    pub fn with_decoder<T, D, F>(label: &'static str, decoder: D, fulfill: F) -> Self
    where
        D: FnOnce(NativePayload) -> Result<T, DecodeError> + Send + Sync + 'static,
        F: FnOnce(Result<T, CallError>) + Send + Sync + 'static,
    {
        Self::new(label, move |id, delivery| {
            let outcome = match delivery {
                Delivery::Payload(payload) => {
                    decoder(payload).map_err(|source| CallError::Decode { id, source })
                }
                Delivery::Failure(err) => Err(err),
            };
            fulfill(outcome)
        })
    }

    /// Like [`with_decoder`](Self::with_decoder) using `T`'s [`Decode`] impl.
    pub fn decoding<T, F>(label: &'static str, fulfill: F) -> Self
    where
        T: Decode,
        F: FnOnce(Result<T, CallError>) + Send + Sync + 'static,
    {
        Self::with_decoder(label, T::decode, fulfill)
    }

    /// Operation name, for logs.
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn resolve(self, id: CorrelationId, delivery: Delivery) {
        (self.resolve)(id, delivery)
    }
}

impl std::fmt::Debug for Continuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Continuation")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
