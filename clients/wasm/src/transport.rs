//! JS callback transport.
//!
//! Outbound messages go to a single JS function as JSON strings. Attaching
//! fails outside a browser window (e.g. under node), which leaves the game
//! paused until the page resumes it.

use cubewalk::bridge::{BridgeError, HostTransport};
use wasm_bindgen::JsValue;

pub struct JsTransport {
    callback: js_sys::Function,
}

impl JsTransport {
    pub fn new(callback: js_sys::Function) -> Self {
        Self { callback }
    }
}

impl HostTransport for JsTransport {
    fn attach(&mut self) -> Result<(), BridgeError> {
        match web_sys::window() {
            Some(_) => Ok(()),
            None => Err(BridgeError::Unavailable("no browser window".into())),
        }
    }

    fn post(&self, json: &str) -> Result<(), BridgeError> {
        self.callback
            .call1(&JsValue::NULL, &JsValue::from_str(json))
            .map(|_| ())
            .map_err(|e| BridgeError::Post(format!("{:?}", e)))
    }
}
