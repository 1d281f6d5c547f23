//! C-compatible API over [`Engine`].
//!
//! Every call returns a JSON string `{"status": .., "body": ..}` owned by Rust;
//! release it with [`datalens_free_str`]. The engine handle is released with
//! [`datalens_engine_free`].

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::slice;

use crate::common::config::AppCfg;
use crate::common::log;
use crate::data::domain::SessionId;

use super::handlers::{ApiResponse, Engine};

/// ABI version to coordinate with host bindings.
#[no_mangle]
pub extern "C" fn datalens_api_version() -> u32 {
    1
}

/// Create an engine configured from the environment.
#[no_mangle]
pub extern "C" fn datalens_engine_new() -> *mut Engine {
    let cfg = AppCfg::load();
    log::init(&cfg);
    Box::into_raw(Box::new(Engine::new(cfg)))
}

/// Release an engine created by [`datalens_engine_new`].
#[no_mangle]
pub extern "C" fn datalens_engine_free(engine: *mut Engine) {
    if engine.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(engine));
    }
}

/// Upload `len` bytes of CSV for `session`. A null `data` means no file.
#[no_mangle]
pub extern "C" fn datalens_upload(
    engine: *const Engine,
    session: *const c_char,
    data: *const u8,
    len: usize,
) -> *mut c_char {
    let (engine, session) = match resolve(engine, session) {
        Ok(pair) => pair,
        Err(response) => return response_to_raw(&response),
    };
    let file = if data.is_null() {
        None
    } else {
        Some(unsafe { slice::from_raw_parts(data, len) })
    };
    response_to_raw(&engine.upload(&session, file))
}

#[no_mangle]
pub extern "C" fn datalens_clean(engine: *const Engine, session: *const c_char) -> *mut c_char {
    match resolve(engine, session) {
        Ok((engine, session)) => response_to_raw(&engine.clean(&session)),
        Err(response) => response_to_raw(&response),
    }
}

#[no_mangle]
pub extern "C" fn datalens_analyze(engine: *const Engine, session: *const c_char) -> *mut c_char {
    match resolve(engine, session) {
        Ok((engine, session)) => response_to_raw(&engine.analyze(&session)),
        Err(response) => response_to_raw(&response),
    }
}

/// Score a model for the JSON request body `{"target": "<column>"}`.
#[no_mangle]
pub extern "C" fn datalens_predict(
    engine: *const Engine,
    session: *const c_char,
    body: *const c_char,
) -> *mut c_char {
    let (engine, session) = match resolve(engine, session) {
        Ok(pair) => pair,
        Err(response) => return response_to_raw(&response),
    };
    if body.is_null() {
        return response_to_raw(&ApiResponse::error(400, "request body is required"));
    }
    let body = unsafe { CStr::from_ptr(body) }.to_bytes();
    response_to_raw(&engine.predict(&session, body))
}

/// Free strings allocated by Rust.
#[no_mangle]
pub extern "C" fn datalens_free_str(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(ptr));
    }
}

/// Borrow the engine and read the session id; a null session selects the
/// configured default.
fn resolve<'a>(
    engine: *const Engine,
    session: *const c_char,
) -> Result<(&'a Engine, SessionId), ApiResponse> {
    let engine = unsafe { engine.as_ref() }
        .ok_or_else(|| ApiResponse::error(400, "engine handle is null"))?;
    let session = if session.is_null() {
        engine.default_session()
    } else {
        let raw = unsafe { CStr::from_ptr(session) }.to_string_lossy();
        SessionId::new(raw.into_owned())
    };
    Ok((engine, session))
}

fn response_to_raw(response: &ApiResponse) -> *mut c_char {
    let json = serde_json::to_string(response)
        .unwrap_or_else(|_| r#"{"status":500,"body":{"error":"response encoding failed"}}"#.into());
    match CString::new(json) {
        Ok(cstring) => cstring.into_raw(),
        Err(_) => fallback_json_raw(),
    }
}

fn fallback_json_raw() -> *mut c_char {
    CString::from(c"{\"status\":500,\"body\":{\"error\":\"interior nul in response\"}}").into_raw()
}
