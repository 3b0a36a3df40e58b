/// ImobiliarePlus - favorite and hide controls for Romanian real-estate listings
/// Built with Rust + WASM + Yew

pub mod dom;
pub mod error;
pub mod extract;
pub mod identity;
pub mod listing;
pub mod price;
pub mod profile;
pub mod property;
pub mod relay;
pub mod scanner;
pub mod settings;
pub mod storage;
pub mod store;

#[cfg(target_arch = "wasm32")]
pub mod ui;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Attach controls to listing cards on a supported site
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_content_script() {
    web::content::run();
}

// Service worker events, forwarded by the listeners js/background.js registers
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn background_installed(reason: String) {
    web::background::on_installed(&reason);
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn background_message(message: JsValue) -> js_sys::Promise {
    web::background::on_message(message)
}

// Start the Yew app for the list manager popup
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
