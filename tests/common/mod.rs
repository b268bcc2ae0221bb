//! Purpose: Stub engines for exercising the marshallers without libminify.
//! Exports: stub `EngineApi` tables, recorded-call inspection, fault toggles.
//! Invariants: Error strings are malloc'd so the adapter's release path is
//! the real one.
#![allow(dead_code)]

use std::ffi::CStr;
use std::os::raw::{c_char, c_longlong};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use minify_bridge::core::engine::EngineApi;

pub static CONFIG_CALLS: AtomicUsize = AtomicUsize::new(0);
pub static STRING_CALLS: AtomicUsize = AtomicUsize::new(0);
pub static FILE_CALLS: AtomicUsize = AtomicUsize::new(0);
pub static CLEANUP_CALLS: AtomicUsize = AtomicUsize::new(0);

static RECORDED_CONFIG: Mutex<Vec<(String, String)>> = Mutex::new(Vec::new());

// Stubs share process-global state; tests that read or reset it take this
// lock first.
static TEST_LOCK: Mutex<()> = Mutex::new(());

pub fn lock() -> MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn reset() {
    CONFIG_CALLS.store(0, Ordering::SeqCst);
    STRING_CALLS.store(0, Ordering::SeqCst);
    FILE_CALLS.store(0, Ordering::SeqCst);
    CLEANUP_CALLS.store(0, Ordering::SeqCst);
    recorded_config_storage().clear();
}

pub fn recorded_config() -> Vec<(String, String)> {
    recorded_config_storage().clone()
}

fn recorded_config_storage() -> MutexGuard<'static, Vec<(String, String)>> {
    RECORDED_CONFIG.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Allocates an engine-style error message with the C allocator, matching
/// how the real engine hands error strings across the boundary.
pub fn alloc_error(text: &str) -> *mut c_char {
    let buf = unsafe { libc::malloc(text.len() + 1) } as *mut u8;
    assert!(!buf.is_null(), "stub malloc failed");
    unsafe {
        std::ptr::copy_nonoverlapping(text.as_ptr(), buf, text.len());
        *buf.add(text.len()) = 0;
    }
    buf as *mut c_char
}

/// Records config entries, copies string input through unchanged, copies
/// files byte-for-byte, counts cleanup runs.
pub fn recording_api() -> EngineApi {
    EngineApi {
        configure: record_configure,
        minify_string: passthrough_string,
        minify_file: copy_file,
        cleanup: count_cleanup,
    }
}

/// Every operation fails with a fixed engine message.
pub fn failing_api() -> EngineApi {
    EngineApi {
        configure: fail_configure,
        minify_string: fail_string,
        minify_file: fail_file,
        cleanup: count_cleanup,
    }
}

/// Reports more output bytes than the input held.
pub fn overflowing_api() -> EngineApi {
    EngineApi {
        configure: record_configure,
        minify_string: overflow_string,
        minify_file: copy_file,
        cleanup: count_cleanup,
    }
}

/// Reports a negative output length.
pub fn negative_length_api() -> EngineApi {
    EngineApi {
        configure: record_configure,
        minify_string: negative_string,
        minify_file: copy_file,
        cleanup: count_cleanup,
    }
}

/// Writes bytes that are not valid UTF-8.
pub fn invalid_utf8_api() -> EngineApi {
    EngineApi {
        configure: record_configure,
        minify_string: garbage_string,
        minify_file: copy_file,
        cleanup: count_cleanup,
    }
}

unsafe extern "C" fn record_configure(
    keys: *mut *mut c_char,
    vals: *mut *mut c_char,
    count: c_longlong,
) -> *mut c_char {
    CONFIG_CALLS.fetch_add(1, Ordering::SeqCst);
    let mut recorded = recorded_config_storage();
    if count > 0 {
        let keys = unsafe { std::slice::from_raw_parts(keys, count as usize) };
        let vals = unsafe { std::slice::from_raw_parts(vals, count as usize) };
        for (key, val) in keys.iter().zip(vals) {
            let key = unsafe { CStr::from_ptr(*key) }.to_string_lossy().into_owned();
            let val = unsafe { CStr::from_ptr(*val) }.to_string_lossy().into_owned();
            recorded.push((key, val));
        }
    }
    std::ptr::null_mut()
}

unsafe extern "C" fn passthrough_string(
    _mediatype: *mut c_char,
    input: *mut c_char,
    input_length: c_longlong,
    output: *mut c_char,
    output_length: *mut c_longlong,
) -> *mut c_char {
    STRING_CALLS.fetch_add(1, Ordering::SeqCst);
    unsafe {
        if input_length > 0 {
            std::ptr::copy_nonoverlapping(input, output, input_length as usize);
        }
        *output_length = input_length;
    }
    std::ptr::null_mut()
}

unsafe extern "C" fn overflow_string(
    _mediatype: *mut c_char,
    _input: *mut c_char,
    input_length: c_longlong,
    _output: *mut c_char,
    output_length: *mut c_longlong,
) -> *mut c_char {
    STRING_CALLS.fetch_add(1, Ordering::SeqCst);
    unsafe { *output_length = input_length + 17 };
    std::ptr::null_mut()
}

unsafe extern "C" fn negative_string(
    _mediatype: *mut c_char,
    _input: *mut c_char,
    _input_length: c_longlong,
    _output: *mut c_char,
    output_length: *mut c_longlong,
) -> *mut c_char {
    STRING_CALLS.fetch_add(1, Ordering::SeqCst);
    unsafe { *output_length = -1 };
    std::ptr::null_mut()
}

unsafe extern "C" fn garbage_string(
    _mediatype: *mut c_char,
    _input: *mut c_char,
    input_length: c_longlong,
    output: *mut c_char,
    output_length: *mut c_longlong,
) -> *mut c_char {
    STRING_CALLS.fetch_add(1, Ordering::SeqCst);
    assert!(input_length >= 1, "garbage stub needs a non-empty input");
    unsafe {
        *output = 0xffu8 as c_char;
        *output_length = 1;
    }
    std::ptr::null_mut()
}

unsafe extern "C" fn copy_file(
    _mediatype: *mut c_char,
    input_path: *mut c_char,
    output_path: *mut c_char,
) -> *mut c_char {
    FILE_CALLS.fetch_add(1, Ordering::SeqCst);
    let input = unsafe { CStr::from_ptr(input_path) }.to_string_lossy();
    let data = match std::fs::read(&*input) {
        Ok(data) => data,
        Err(_) => return alloc_error("cannot open input file"),
    };
    let output = unsafe { CStr::from_ptr(output_path) }.to_string_lossy();
    match std::fs::write(&*output, data) {
        Ok(()) => std::ptr::null_mut(),
        Err(_) => alloc_error("cannot write output file"),
    }
}

unsafe extern "C" fn fail_configure(
    _keys: *mut *mut c_char,
    _vals: *mut *mut c_char,
    _count: c_longlong,
) -> *mut c_char {
    CONFIG_CALLS.fetch_add(1, Ordering::SeqCst);
    alloc_error("unknown config key: frobnicate")
}

unsafe extern "C" fn fail_string(
    _mediatype: *mut c_char,
    _input: *mut c_char,
    _input_length: c_longlong,
    _output: *mut c_char,
    _output_length: *mut c_longlong,
) -> *mut c_char {
    STRING_CALLS.fetch_add(1, Ordering::SeqCst);
    alloc_error("unknown mediatype: foo/bar")
}

unsafe extern "C" fn fail_file(
    _mediatype: *mut c_char,
    _input_path: *mut c_char,
    _output_path: *mut c_char,
) -> *mut c_char {
    FILE_CALLS.fetch_add(1, Ordering::SeqCst);
    alloc_error("cannot open input file")
}

unsafe extern "C" fn count_cleanup() {
    CLEANUP_CALLS.fetch_add(1, Ordering::SeqCst);
}
