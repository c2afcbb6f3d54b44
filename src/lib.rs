#![cfg_attr(not(test), no_std)]

pub mod button;

pub use button::{
    config::{ButtonConfig, ConfigError, TimingWindow, DEFAULT_BUTTON_CONFIG, MAX_WINDOW_MS},
    engine::{ButtonEngine, EngineOutput, RawLevelOutput},
    observer::{notify, ButtonObserver, ObservedButton},
    trace::EngineTraceSample,
    types::{
        ButtonEvent, DebounceDisposition, DispatchCause, EventBuffer, Gesture, GestureStateId,
    },
};

#[cfg(feature = "embassy")]
pub use button::tasks::{run_button, ButtonEventFrame, ButtonInput, RawLevelSample};
