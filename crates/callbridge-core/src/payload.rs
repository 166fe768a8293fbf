//! Callback payloads and the decoders that turn them into typed results.
//!
//! A native callback carries `(id, status, args...)`. The trailing arguments
//! are captured positionally as a [`NativePayload`]; the call site picks the
//! result type and therefore the [`Decode`] impl when it registers the call.

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::DecodeError;

/// One positional callback argument, copied out of native memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeValue {
    /// A library handle (wallet, pool, search, object handle ...).
    Handle(i32),
    Bool(bool),
    U64(u64),
    /// A C string; `None` when the native side passed a null pointer.
    Str(Option<String>),
    Bytes(Bytes),
}

impl NativeValue {
    fn type_name(&self) -> &'static str {
        match self {
            NativeValue::Handle(_) => "handle",
            NativeValue::Bool(_) => "bool",
            NativeValue::U64(_) => "u64",
            NativeValue::Str(_) => "string",
            NativeValue::Bytes(_) => "bytes",
        }
    }
}

/// The ordered trailing arguments of a callback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativePayload(Vec<NativeValue>);

impl NativePayload {
    /// A payload with no arguments (the `(id, status)` callback shape).
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn new(values: Vec<NativeValue>) -> Self {
        Self(values)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self(vec![NativeValue::Str(Some(value.into()))])
    }

    pub fn handle(value: i32) -> Self {
        Self(vec![NativeValue::Handle(value)])
    }

    /// Append an argument.
    pub fn with(mut self, value: NativeValue) -> Self {
        self.0.push(value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[NativeValue] {
        &self.0
    }

    pub fn into_values(self) -> Vec<NativeValue> {
        self.0
    }

    /// Require exactly `N` arguments.
    fn exact<const N: usize>(self) -> Result<[NativeValue; N], DecodeError> {
        let got = self.0.len();
        self.0
            .try_into()
            .map_err(|_| DecodeError::Arity { expected: N, got })
    }
}

impl From<Vec<NativeValue>> for NativePayload {
    fn from(values: Vec<NativeValue>) -> Self {
        Self(values)
    }
}

fn mismatch(position: usize, expected: &'static str, value: &NativeValue) -> DecodeError {
    DecodeError::Type {
        position,
        expected,
        got: value.type_name(),
    }
}

fn take_string(position: usize, value: NativeValue) -> Result<String, DecodeError> {
    match value {
        NativeValue::Str(Some(s)) => Ok(s),
        NativeValue::Str(None) => Err(DecodeError::Null { position }),
        other => Err(mismatch(position, "string", &other)),
    }
}

fn take_bytes(position: usize, value: NativeValue) -> Result<Bytes, DecodeError> {
    match value {
        NativeValue::Bytes(b) => Ok(b),
        other => Err(mismatch(position, "bytes", &other)),
    }
}

fn take_u64(position: usize, value: NativeValue) -> Result<u64, DecodeError> {
    match value {
        NativeValue::U64(n) => Ok(n),
        other => Err(mismatch(position, "u64", &other)),
    }
}

/// Conversion from a success payload into an operation's result type.
pub trait Decode: Sized + Send + 'static {
    fn decode(payload: NativePayload) -> Result<Self, DecodeError>;
}

impl Decode for () {
    fn decode(payload: NativePayload) -> Result<Self, DecodeError> {
        let [] = payload.exact::<0>()?;
        Ok(())
    }
}

impl Decode for i32 {
    fn decode(payload: NativePayload) -> Result<Self, DecodeError> {
        match payload.exact::<1>()? {
            [NativeValue::Handle(h)] => Ok(h),
            [other] => Err(mismatch(0, "handle", &other)),
        }
    }
}

impl Decode for bool {
    fn decode(payload: NativePayload) -> Result<Self, DecodeError> {
        match payload.exact::<1>()? {
            [NativeValue::Bool(b)] => Ok(b),
            [other] => Err(mismatch(0, "bool", &other)),
        }
    }
}

impl Decode for u64 {
    fn decode(payload: NativePayload) -> Result<Self, DecodeError> {
        let [value] = payload.exact::<1>()?;
        take_u64(0, value)
    }
}

impl Decode for String {
    fn decode(payload: NativePayload) -> Result<Self, DecodeError> {
        let [value] = payload.exact::<1>()?;
        take_string(0, value)
    }
}

impl Decode for Option<String> {
    fn decode(payload: NativePayload) -> Result<Self, DecodeError> {
        match payload.exact::<1>()? {
            [NativeValue::Str(s)] => Ok(s),
            [other] => Err(mismatch(0, "string", &other)),
        }
    }
}

impl Decode for Bytes {
    fn decode(payload: NativePayload) -> Result<Self, DecodeError> {
        let [value] = payload.exact::<1>()?;
        take_bytes(0, value)
    }
}

impl Decode for Vec<u8> {
    fn decode(payload: NativePayload) -> Result<Self, DecodeError> {
        Bytes::decode(payload).map(|b| b.to_vec())
    }
}

impl Decode for (String, String) {
    fn decode(payload: NativePayload) -> Result<Self, DecodeError> {
        let [a, b] = payload.exact::<2>()?;
        Ok((take_string(0, a)?, take_string(1, b)?))
    }
}

impl Decode for (String, Bytes) {
    fn decode(payload: NativePayload) -> Result<Self, DecodeError> {
        let [a, b] = payload.exact::<2>()?;
        Ok((take_string(0, a)?, take_bytes(1, b)?))
    }
}

impl Decode for (String, String, u64) {
    fn decode(payload: NativePayload) -> Result<Self, DecodeError> {
        let [a, b, c] = payload.exact::<3>()?;
        Ok((take_string(0, a)?, take_string(1, b)?, take_u64(2, c)?))
    }
}

/// A single JSON string argument parsed into `T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned + Send + 'static> Decode for Json<T> {
    fn decode(payload: NativePayload) -> Result<Self, DecodeError> {
        let raw = String::decode(payload)?;
        serde_json::from_str(&raw)
            .map(Json)
            .map_err(|e| DecodeError::Json(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_decode_empty() {
        assert!(<()>::decode(NativePayload::empty()).is_ok());
        let err = <()>::decode(NativePayload::handle(3)).unwrap_err();
        assert_eq!(err, DecodeError::Arity { expected: 0, got: 1 });
    }

    #[test]
    fn test_decode_string_rejects_null() {
        let payload = NativePayload::new(vec![NativeValue::Str(None)]);
        assert_eq!(
            String::decode(payload.clone()).unwrap_err(),
            DecodeError::Null { position: 0 }
        );
        assert_eq!(Option::<String>::decode(payload).unwrap(), None);
    }

    #[test]
    fn test_decode_type_mismatch() {
        let err = i32::decode(NativePayload::string("7")).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Type {
                position: 0,
                expected: "handle",
                got: "string",
            }
        );
    }

    #[test]
    fn test_decode_string_pair() {
        let payload = NativePayload::string("did:sov:abc")
            .with(NativeValue::Str(Some("verkey".into())));
        let (did, verkey) = <(String, String)>::decode(payload).unwrap();
        assert_eq!(did, "did:sov:abc");
        assert_eq!(verkey, "verkey");
    }

    #[test]
    fn test_decode_string_string_u64() {
        let payload = NativePayload::string("delta")
            .with(NativeValue::Str(Some("rev_reg".into())))
            .with(NativeValue::U64(1_700_000_000));
        let (_, _, ts) = <(String, String, u64)>::decode(payload).unwrap();
        assert_eq!(ts, 1_700_000_000);
    }

    #[test]
    fn test_decode_bytes() {
        let payload = NativePayload::new(vec![NativeValue::Bytes(Bytes::from_static(b"sig"))]);
        assert_eq!(Vec::<u8>::decode(payload).unwrap(), b"sig".to_vec());
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Schema {
        name: String,
        version: String,
    }

    #[test]
    fn test_decode_json() {
        let payload = NativePayload::string(r#"{"name":"gvt","version":"1.0"}"#);
        let Json(schema) = Json::<Schema>::decode(payload).unwrap();
        assert_eq!(schema.name, "gvt");

        let err = Json::<Schema>::decode(NativePayload::string("{not json")).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }
}
