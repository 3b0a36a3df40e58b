/// Background service worker: owns the store and answers relay requests
///
/// The worker script registers the chrome listeners itself in its first
/// turn and forwards events here once the module has loaded.
use super::bridge::broadcastToTabs;
use super::storage::ChromeStorage;
use crate::error::RelayError;
use crate::relay::{Message, Relay, Reply};
use crate::store::CollectionStore;
use log::{debug, info, warn};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

thread_local! {
    static RELAY: Rc<Relay<ChromeStorage>> =
        Rc::new(Relay::new(CollectionStore::new(ChromeStorage, js_sys::Date::now)));
}

fn relay() -> Rc<Relay<ChromeStorage>> {
    RELAY.with(Rc::clone)
}

/// `chrome.runtime.onInstalled`: seed empty collections on first install.
pub fn on_installed(reason: &str) {
    if reason != "install" {
        return;
    }
    let relay = relay();
    spawn_local(async move {
        match relay.store().initialize().await {
            Ok(()) => info!("ImobiliarePlus extension installed"),
            Err(e) => warn!("Failed to initialize storage: {}", e),
        }
    });
}

/// `chrome.runtime.onMessage`: resolves with the reply to send back.
pub fn on_message(raw: JsValue) -> js_sys::Promise {
    let relay = relay();
    future_to_promise(async move {
        let reply = handle(&relay, raw).await;
        serde_wasm_bindgen::to_value(&reply).map_err(|e| JsValue::from_str(&e.to_string()))
    })
}

async fn handle(relay: &Relay<ChromeStorage>, raw: JsValue) -> Reply {
    let message: Message = match serde_wasm_bindgen::from_value(raw) {
        Ok(message) => message,
        Err(e) => {
            let error = RelayError::Malformed(e.to_string());
            warn!("{}", error);
            return Reply::failure(error);
        }
    };

    let dispatch = relay.dispatch(message).await;
    if let Some(broadcast) = dispatch.broadcast {
        spawn_local(async move {
            let value = match serde_wasm_bindgen::to_value(&broadcast) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Failed to serialize broadcast: {}", e);
                    return;
                }
            };
            if let Err(e) = broadcastToTabs(value).await {
                debug!("Broadcast not delivered: {:?}", e);
            }
        });
    }
    dispatch.reply
}
