//! Browser timers
//!
//! `Interval` clears itself on drop, so replacing the stored handle is all it
//! takes to re-arm without ever running two tick loops.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

pub struct Interval {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Interval {
    pub fn new(period_ms: u32, callback: impl FnMut() + 'static) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let callback = Closure::<dyn FnMut()>::new(callback);
        let handle = window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            period_ms as i32,
        )?;
        Ok(Self {
            handle,
            _callback: callback,
        })
    }

    /// Stop ticking; safe to call from inside the interval's own callback
    pub fn cancel(self) {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(self.handle);
        }
        // The callback may be running right now; release it on a later turn
        set_timeout(0, move || drop(self));
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(self.handle);
        }
    }
}

/// Run `callback` once after `delay_ms`
pub fn set_timeout(delay_ms: u32, callback: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(callback);
    if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        delay_ms as i32,
    ) {
        log::warn!("setTimeout failed: {:?}", e);
    }
}
