//! C ABI for the lgbm bridge.
//!
//! This cdylib is what a managed host (JVM, CLR, Python ctypes) loads. Every
//! exported function returns `0` on success and `-1` on failure; the failure
//! text is kept per thread and read back with [`LGBMB_GetLastError`].
//! Handles are opaque `u64` values, `0` meaning "none".
//!
//! The bridge is created on first use from `LGBM_BRIDGE_CONFIG` (or the
//! default config path) and loads the engine library named there or in
//! `LGBM_BRIDGE_LIB`.

pub mod booster;
pub mod dataset;
pub mod error;
mod ffi;
pub mod predict;

use std::any::Any;
use std::cell::RefCell;
use std::ffi::{c_char, c_int, CString};
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing::{info, warn};

use lgbm_bridge::Bridge;
use lgbm_core::config::{default_config_path, BridgeConfig};

use crate::error::ApiError;

pub const SUCCESS: c_int = 0;
pub const FAILURE: c_int = -1;

static BRIDGE: OnceLock<Bridge> = OnceLock::new();
static INIT: Mutex<()> = Mutex::new(());

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::from(c"Everything is fine"));
}

/// Install a bridge before the first exported call. Returns the bridge back
/// if one is already in place.
pub fn install_bridge(bridge: Bridge) -> Result<(), Bridge> {
    lgbm_common::try_init_logging("warn");
    BRIDGE.set(bridge)
}

fn bridge() -> Result<&'static Bridge, ApiError> {
    if let Some(bridge) = BRIDGE.get() {
        return Ok(bridge);
    }

    let _guard = INIT.lock();
    if let Some(bridge) = BRIDGE.get() {
        return Ok(bridge);
    }

    lgbm_common::try_init_logging("warn");
    let path = default_config_path();
    let config = BridgeConfig::load_or_default(&path);
    info!("initializing bridge (config {})", path);
    let bridge = Bridge::from_config(config)?;
    Ok(BRIDGE.get_or_init(|| bridge))
}

fn set_last_error(message: String) {
    let message = CString::new(message.replace('\0', " ")).unwrap_or_default();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = message);
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

/// Run one exported call: status code out, message into the thread's buffer.
/// Panics are caught here and never cross into the host.
pub(crate) fn run(op: &'static str, f: impl FnOnce(&'static Bridge) -> Result<(), ApiError>) -> c_int {
    let result = panic::catch_unwind(AssertUnwindSafe(|| bridge().and_then(f)))
        .unwrap_or_else(|payload| Err(ApiError::Panic(panic_message(payload))));
    match result {
        Ok(()) => SUCCESS,
        Err(e) => {
            warn!("{} failed: {}", op, e);
            set_last_error(e.to_string());
            FAILURE
        }
    }
}

/// Message of the last failed call on this thread.
///
/// The pointer stays valid until the next failing call on the same thread.
/// The caller must not free it.
#[no_mangle]
pub extern "C" fn LGBMB_GetLastError() -> *const c_char {
    LAST_ERROR.with(|slot| slot.borrow().as_ptr())
}
