/// List Manager UI
mod components;
pub mod popup;
