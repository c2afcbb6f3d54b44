pub mod config;
mod debounce;
pub mod engine;
mod gesture_hsm;
pub mod observer;
#[cfg(feature = "embassy")]
pub mod tasks;
mod timer;
pub mod trace;
pub mod types;
