//! Proptest generators for property-based testing.

use bytes::Bytes;
use proptest::prelude::*;

use callbridge_core::{CorrelationId, NativePayload, NativeValue, StatusCode, SDK_ERRORS};

/// A valid correlation id.
pub fn correlation_id() -> impl Strategy<Value = CorrelationId> {
    (1..=i32::MAX).prop_map(CorrelationId)
}

/// A status code present in the SDK table.
pub fn known_code() -> impl Strategy<Value = StatusCode> {
    prop::sample::select(SDK_ERRORS).prop_map(|descriptor| StatusCode(descriptor.code))
}

/// Any 32-bit status code, known or not.
pub fn any_code() -> impl Strategy<Value = StatusCode> {
    prop_oneof![known_code(), any::<i32>().prop_map(StatusCode)]
}

/// A non-success status code.
pub fn failure_code() -> impl Strategy<Value = StatusCode> {
    any_code().prop_filter("non-success", |code| !code.is_success())
}

pub fn native_value() -> impl Strategy<Value = NativeValue> {
    prop_oneof![
        any::<i32>().prop_map(NativeValue::Handle),
        any::<bool>().prop_map(NativeValue::Bool),
        any::<u64>().prop_map(NativeValue::U64),
        proptest::option::of("[ -~]{0,48}").prop_map(NativeValue::Str),
        prop::collection::vec(any::<u8>(), 0..=64).prop_map(|v| NativeValue::Bytes(Bytes::from(v))),
    ]
}

/// A payload of up to `max_len` values of mixed shapes.
pub fn native_payload(max_len: usize) -> impl Strategy<Value = NativePayload> {
    prop::collection::vec(native_value(), 0..=max_len).prop_map(NativePayload::new)
}

/// A single non-null string payload, as delivered by string callbacks.
pub fn string_payload() -> impl Strategy<Value = (String, NativePayload)> {
    "[ -~]{0,64}".prop_map(|s| (s.clone(), NativePayload::string(s)))
}

/// Status and payload for one callback.
pub fn callback() -> impl Strategy<Value = (StatusCode, NativePayload)> {
    prop_oneof![
        3 => native_payload(4).prop_map(|payload| (StatusCode::SUCCESS, payload)),
        1 => failure_code().prop_map(|code| (code, NativePayload::empty())),
    ]
}
