use crate::button::types::{DispatchCause, GestureStateId};

/// Snapshot of the engine after its most recent state-machine dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineTraceSample {
    pub now_ms: u64,
    pub state_id: GestureStateId,
    pub cause: DispatchCause,
    pub logical_level: bool,
    pub debouncing: bool,
    pub debounce_deadline_ms: Option<u64>,
    pub emit_deadline_ms: Option<u64>,
    pub gestures_emitted: u32,
}
