/// chrome.runtime request/response transport
use super::bridge::sendMessage;
use crate::error::RelayError;
use crate::relay::{Message, Reply};
use crate::scanner::{Messenger, ReplyHandler};
use wasm_bindgen_futures::spawn_local;

#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeMessenger;

impl RuntimeMessenger {
    /// Send one request to the background context and decode its reply.
    pub async fn request(message: &Message) -> Result<Reply, RelayError> {
        let value = serde_wasm_bindgen::to_value(message).map_err(|e| RelayError::Malformed(e.to_string()))?;
        let reply = sendMessage(value)
            .await
            .map_err(|e| RelayError::Disconnected(format!("{:?}", e)))?;

        if reply.is_null() || reply.is_undefined() {
            return Err(RelayError::Disconnected("no reply".to_string()));
        }
        serde_wasm_bindgen::from_value(reply).map_err(|e| RelayError::Malformed(e.to_string()))
    }
}

impl Messenger for RuntimeMessenger {
    fn send(&self, message: Message, on_reply: ReplyHandler) {
        spawn_local(async move {
            on_reply(Self::request(&message).await);
        });
    }
}
