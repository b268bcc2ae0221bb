//! Purpose: C ABI surface for FFI hosts (libminify_bridge).
//! Exports: C-callable engine-load/config/string/file/shutdown functions and
//! buffer/error helpers.
//! Role: The embedding for hosts whose dynamic value model is JSON + C strings.
//! Invariants: JSON bytes in for config; explicit free functions for every
//! adapter-owned allocation handed out.
//! Invariants: Error kinds map 1:1 with core error kinds.
#![allow(non_camel_case_types)]

use crate::core::config::ConfigSet;
use crate::core::engine::{self, Engine};
use crate::core::error::{Error, ErrorKind, to_abi_code};
use crate::core::value::ConfigValue;
use serde_json::Value;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

#[repr(C)]
pub struct mnfy_buf {
    pub data: *mut u8,
    pub len: usize,
}

#[repr(C)]
pub struct mnfy_error {
    pub kind: i32,
    pub message: *mut c_char,
}

#[unsafe(no_mangle)]
pub extern "C" fn mnfy_engine_load(
    path: *const c_char,
    out_err: *mut *mut mnfy_error,
) -> i32 {
    let path = match parse_utf8(path, "path", out_err) {
        Ok(path) => path,
        Err(code) => return code,
    };
    let loaded = match Engine::load(path) {
        Ok(loaded) => loaded,
        Err(err) => return fail(out_err, err),
    };
    engine::install(loaded);
    0
}

#[unsafe(no_mangle)]
pub extern "C" fn mnfy_config(
    json: *const u8,
    len: usize,
    out_err: *mut *mut mnfy_error,
) -> i32 {
    if json.is_null() {
        return fail(
            out_err,
            Error::new(ErrorKind::Arity, "expected config argument"),
        );
    }
    let slice = unsafe { std::slice::from_raw_parts(json, len) };
    let value: Value = match serde_json::from_slice(slice) {
        Ok(value) => value,
        Err(err) => {
            return fail(
                out_err,
                Error::new(ErrorKind::Type, "config must be an object").with_source(err),
            );
        }
    };
    let object = match value.as_object() {
        Some(object) => object,
        None => {
            return fail(
                out_err,
                Error::new(ErrorKind::Type, "config must be an object"),
            );
        }
    };

    let mut set = ConfigSet::with_capacity(object.len());
    for (key, member) in object {
        let value = match config_value(member) {
            Ok(value) => value,
            Err(err) => return fail(out_err, err),
        };
        if let Err(err) = set.push(key, value) {
            return fail(out_err, err);
        }
    }

    match engine::configure(&set) {
        Ok(()) => 0,
        Err(err) => fail(out_err, err),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn mnfy_string(
    mediatype: *const c_char,
    input: *const u8,
    input_len: usize,
    out: *mut mnfy_buf,
    out_err: *mut *mut mnfy_error,
) -> i32 {
    let mediatype = match parse_utf8(mediatype, "mediatype", out_err) {
        Ok(mediatype) => mediatype,
        Err(code) => return code,
    };
    if input.is_null() {
        return fail(out_err, Error::new(ErrorKind::Type, "input is null"));
    }
    let slice = unsafe { std::slice::from_raw_parts(input, input_len) };
    let input = match std::str::from_utf8(slice) {
        Ok(input) => input,
        Err(err) => {
            return fail(
                out_err,
                Error::new(ErrorKind::Encoding, "input is not valid UTF-8").with_source(err),
            );
        }
    };
    if out.is_null() {
        return fail(out_err, Error::new(ErrorKind::Type, "out is null"));
    }

    let minified = match engine::minify_string(mediatype, input) {
        Ok(minified) => minified,
        Err(err) => return fail(out_err, err),
    };
    unsafe {
        let out = &mut *out;
        let mut data = minified.into_bytes().into_boxed_slice();
        out.len = data.len();
        out.data = data.as_mut_ptr();
        std::mem::forget(data);
    }
    0
}

#[unsafe(no_mangle)]
pub extern "C" fn mnfy_file(
    mediatype: *const c_char,
    input_path: *const c_char,
    output_path: *const c_char,
    out_err: *mut *mut mnfy_error,
) -> i32 {
    let mediatype = match parse_utf8(mediatype, "mediatype", out_err) {
        Ok(mediatype) => mediatype,
        Err(code) => return code,
    };
    let input_path = match parse_utf8(input_path, "input path", out_err) {
        Ok(input_path) => input_path,
        Err(code) => return code,
    };
    let output_path = match parse_utf8(output_path, "output path", out_err) {
        Ok(output_path) => output_path,
        Err(code) => return code,
    };

    match engine::minify_file(mediatype, input_path, output_path) {
        Ok(()) => 0,
        Err(err) => fail(out_err, err),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn mnfy_shutdown() {
    engine::shutdown();
}

#[unsafe(no_mangle)]
pub extern "C" fn mnfy_buf_free(buf: *mut mnfy_buf) {
    if buf.is_null() {
        return;
    }
    unsafe {
        let buf = &mut *buf;
        if !buf.data.is_null() && buf.len != 0 {
            drop(Vec::from_raw_parts(buf.data, buf.len, buf.len));
        }
        buf.data = ptr::null_mut();
        buf.len = 0;
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn mnfy_error_free(err: *mut mnfy_error) {
    if err.is_null() {
        return;
    }
    unsafe {
        let err = Box::from_raw(err);
        if !err.message.is_null() {
            drop(CString::from_raw(err.message));
        }
    }
}

fn config_value(member: &Value) -> Result<ConfigValue, Error> {
    match member {
        Value::String(text) => Ok(ConfigValue::Str(text.clone())),
        Value::Bool(flag) => Ok(ConfigValue::Bool(*flag)),
        Value::Number(number) => match number.as_i64() {
            Some(int) => Ok(ConfigValue::Int(int)),
            None => Err(Error::new(
                ErrorKind::Type,
                "config values must be strings, integers, or booleans",
            )),
        },
        _ => Err(Error::new(
            ErrorKind::Type,
            "config values must be strings, integers, or booleans",
        )),
    }
}

fn parse_utf8<'a>(
    input: *const c_char,
    what: &str,
    out_err: *mut *mut mnfy_error,
) -> Result<&'a str, i32> {
    if input.is_null() {
        return Err(fail(
            out_err,
            Error::new(ErrorKind::Type, format!("{what} is null")),
        ));
    }
    unsafe { CStr::from_ptr(input) }
        .to_str()
        .map_err(|_| Error::new(ErrorKind::Encoding, format!("{what} is not valid UTF-8")))
        .map_err(|err| fail(out_err, err))
}

fn fail(out_err: *mut *mut mnfy_error, err: Error) -> i32 {
    if out_err.is_null() {
        return -1;
    }
    let error = Box::new(mnfy_error {
        kind: to_abi_code(err.kind()),
        message: to_c_string(err.message()),
    });
    unsafe {
        *out_err = Box::into_raw(error);
    }
    -1
}

fn to_c_string(input: &str) -> *mut c_char {
    CString::new(input)
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}
