//! C ABI callback trampolines.
//!
//! The native library takes bare `extern "C"` function pointers with no
//! user-data argument, so callbacks cannot carry a reference to the broker
//! that issued the call. The trampolines here route to a single dispatcher
//! installed with [`install`].
//!
//! Each trampoline matches one callback shape exported by the library,
//! copies its arguments out of native memory into a [`NativePayload`], and
//! dispatches. Pointer arguments must be null or valid for the duration of
//! the callback; that is part of the native calling contract.

use std::ffi::{c_char, CStr};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::sync::OnceLock;

use bytes::Bytes;

use callbridge_core::{
    CorrelationId, ErrorDetailsSource, NativePayload, NativeValue, ResultDispatcher, StatusCode,
};

use crate::broker::CallBroker;
use crate::error::{BridgeError, Result};

pub type ResponseEmptyCB = extern "C" fn(command_handle: i32, err: i32);
pub type ResponseHandleCB = extern "C" fn(command_handle: i32, err: i32, handle: i32);
pub type ResponseBoolCB = extern "C" fn(command_handle: i32, err: i32, value: bool);
pub type ResponseU64CB = extern "C" fn(command_handle: i32, err: i32, value: u64);
pub type ResponseStringCB = extern "C" fn(command_handle: i32, err: i32, value: *const c_char);
pub type ResponseStringStringCB =
    extern "C" fn(command_handle: i32, err: i32, first: *const c_char, second: *const c_char);
pub type ResponseSliceCB =
    extern "C" fn(command_handle: i32, err: i32, data: *const u8, data_len: u32);
pub type ResponseStringSliceCB = extern "C" fn(
    command_handle: i32,
    err: i32,
    value: *const c_char,
    data: *const u8,
    data_len: u32,
);
pub type ResponseStringStringU64CB = extern "C" fn(
    command_handle: i32,
    err: i32,
    first: *const c_char,
    second: *const c_char,
    value: u64,
);

/// Native "current error" accessor: writes a pointer to a JSON string.
pub type GetCurrentErrorFn = unsafe extern "C" fn(error_json_p: *mut *const c_char);

static ROUTE: OnceLock<ResultDispatcher> = OnceLock::new();

/// Route every trampoline in this module to `broker`'s dispatcher.
///
/// Only one broker can own the C route per process.
pub fn install(broker: &CallBroker) -> Result<()> {
    ROUTE
        .set(broker.dispatcher().clone())
        .map_err(|_| BridgeError::AlreadyInstalled)
}

/// The installed dispatcher, if any.
pub fn route() -> Option<&'static ResultDispatcher> {
    ROUTE.get()
}

fn deliver<P>(command_handle: i32, err: i32, payload: P)
where
    P: FnOnce() -> NativePayload,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let Some(dispatcher) = ROUTE.get() else {
            tracing::error!(command_handle, err, "native callback with no dispatcher installed");
            return;
        };
        let _ = dispatcher.dispatch(
            CorrelationId::from_raw(command_handle),
            StatusCode::from_raw(err),
            payload(),
        );
    }));
    if outcome.is_err() {
        // Unwinding into native frames is undefined behaviour.
        std::process::abort();
    }
}

/// Copy a C string; null yields `None`, invalid UTF-8 is replaced lossily.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
pub unsafe fn copy_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

/// Copy a byte buffer; null or zero length yields an empty buffer.
///
/// # Safety
///
/// `data` must be null or valid for reads of `len` bytes.
pub unsafe fn copy_slice(data: *const u8, len: u32) -> Bytes {
    if data.is_null() || len == 0 {
        return Bytes::new();
    }
    Bytes::copy_from_slice(std::slice::from_raw_parts(data, len as usize))
}

fn string_value(ptr: *const c_char) -> NativeValue {
    NativeValue::Str(unsafe { copy_c_str(ptr) })
}

fn slice_value(data: *const u8, len: u32) -> NativeValue {
    NativeValue::Bytes(unsafe { copy_slice(data, len) })
}

pub extern "C" fn cb_empty(command_handle: i32, err: i32) {
    deliver(command_handle, err, NativePayload::empty)
}

pub extern "C" fn cb_handle(command_handle: i32, err: i32, handle: i32) {
    deliver(command_handle, err, || NativePayload::handle(handle))
}

pub extern "C" fn cb_bool(command_handle: i32, err: i32, value: bool) {
    deliver(command_handle, err, || {
        NativePayload::new(vec![NativeValue::Bool(value)])
    })
}

pub extern "C" fn cb_u64(command_handle: i32, err: i32, value: u64) {
    deliver(command_handle, err, || {
        NativePayload::new(vec![NativeValue::U64(value)])
    })
}

pub extern "C" fn cb_string(command_handle: i32, err: i32, value: *const c_char) {
    deliver(command_handle, err, || NativePayload::new(vec![string_value(value)]))
}

pub extern "C" fn cb_string_string(
    command_handle: i32,
    err: i32,
    first: *const c_char,
    second: *const c_char,
) {
    deliver(command_handle, err, || {
        NativePayload::new(vec![string_value(first), string_value(second)])
    })
}

pub extern "C" fn cb_slice(command_handle: i32, err: i32, data: *const u8, data_len: u32) {
    deliver(command_handle, err, || {
        NativePayload::new(vec![slice_value(data, data_len)])
    })
}

pub extern "C" fn cb_string_slice(
    command_handle: i32,
    err: i32,
    value: *const c_char,
    data: *const u8,
    data_len: u32,
) {
    deliver(command_handle, err, || {
        NativePayload::new(vec![string_value(value), slice_value(data, data_len)])
    })
}

pub extern "C" fn cb_string_string_u64(
    command_handle: i32,
    err: i32,
    first: *const c_char,
    second: *const c_char,
    value: u64,
) {
    deliver(command_handle, err, || {
        NativePayload::new(vec![
            string_value(first),
            string_value(second),
            NativeValue::U64(value),
        ])
    })
}

/// [`ErrorDetailsSource`] backed by the library's current-error accessor.
#[derive(Clone, Copy)]
pub struct NativeErrorDetails {
    get_current_error: GetCurrentErrorFn,
}

impl NativeErrorDetails {
    /// # Safety
    ///
    /// `get_current_error` must write either null or a pointer to a
    /// NUL-terminated string that stays valid until the next native call on
    /// the same thread.
    pub unsafe fn new(get_current_error: GetCurrentErrorFn) -> Self {
        Self { get_current_error }
    }
}

impl ErrorDetailsSource for NativeErrorDetails {
    fn current_error(&self) -> Option<String> {
        let mut error_json: *const c_char = ptr::null();
        unsafe {
            (self.get_current_error)(&mut error_json);
            copy_c_str(error_json)
        }
    }
}

impl std::fmt::Debug for NativeErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeErrorDetails").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn test_copy_c_str() {
        let owned = CString::new("did:sov:123").unwrap();
        assert_eq!(unsafe { copy_c_str(owned.as_ptr()) }.as_deref(), Some("did:sov:123"));
        assert_eq!(unsafe { copy_c_str(ptr::null()) }, None);
    }

    #[test]
    fn test_copy_slice() {
        let data = [1u8, 2, 3];
        assert_eq!(unsafe { copy_slice(data.as_ptr(), 3) }.as_ref(), &[1, 2, 3]);
        assert!(unsafe { copy_slice(ptr::null(), 8) }.is_empty());
        assert!(unsafe { copy_slice(data.as_ptr(), 0) }.is_empty());
    }

    unsafe extern "C" fn fake_current_error(error_json_p: *mut *const c_char) {
        static JSON: &[u8] = b"{\"error\":\"WalletItemNotFound\",\"message\":\"no such record\"}\0";
        *error_json_p = JSON.as_ptr() as *const c_char;
    }

    unsafe extern "C" fn no_current_error(error_json_p: *mut *const c_char) {
        *error_json_p = ptr::null();
    }

    #[test]
    fn test_native_error_details() {
        let source = unsafe { NativeErrorDetails::new(fake_current_error) };
        let details = source.details().unwrap();
        assert_eq!(details.error.as_deref(), Some("WalletItemNotFound"));

        let empty = unsafe { NativeErrorDetails::new(no_current_error) };
        assert!(empty.details().is_none());
    }
}
