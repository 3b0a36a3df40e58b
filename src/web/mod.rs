/// Browser glue: chrome bridge, live DOM host and the three entry points' drivers
pub mod background;
mod bridge;
pub mod content;
pub mod host;
pub mod messenger;
pub mod storage;
