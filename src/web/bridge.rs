/// chrome.* APIs, reached through the JS bridge module
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/js/bridge.js")]
extern "C" {
    /// `chrome.runtime.sendMessage`, resolving with the reply.
    #[wasm_bindgen(catch)]
    pub async fn sendMessage(message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    pub async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    pub async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    /// Send to every open tab, ignoring tabs without a content script.
    #[wasm_bindgen(catch)]
    pub async fn broadcastToTabs(message: JsValue) -> Result<(), JsValue>;

    /// Register the runtime message listener. The handler's return value
    /// (plain value or Promise) is sent back as the reply.
    pub fn onMessage(handler: &js_sys::Function);
}
