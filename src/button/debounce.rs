use super::timer::TimerSlot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum DebounceStep {
    /// Debounce is off; feed the level to the gesture machine now.
    Pass(bool),
    /// A fresh window was opened.
    Opened,
    /// A window was already open; only the pending level changed.
    Coalesced,
}

/// Coalesces raw chatter into at most one accepted level per quiet window.
///
/// Last value wins: when the window closes, whatever level arrived most
/// recently is accepted, no matter how many edges came before it.
#[derive(Clone, Copy, Debug)]
pub(super) struct DebounceFilter {
    debounce_ms: u64,
    pending_level: bool,
    window: TimerSlot,
}

impl DebounceFilter {
    pub(super) const fn new(debounce_ms: u64, initial_level: bool) -> Self {
        Self {
            debounce_ms,
            pending_level: initial_level,
            window: TimerSlot::new(),
        }
    }

    pub(super) fn on_level(&mut self, now_ms: u64, level: bool, order: u64) -> DebounceStep {
        self.pending_level = level;
        if self.window.is_armed() {
            log::trace!("button: t={} coalesced level={}", now_ms, level);
            return DebounceStep::Coalesced;
        }
        if self.debounce_ms == 0 {
            return DebounceStep::Pass(level);
        }
        self.window
            .arm(now_ms.saturating_add(self.debounce_ms), order);
        DebounceStep::Opened
    }

    pub(super) fn due_key(&self, now_ms: u64) -> Option<(u64, u64)> {
        self.window.due_key(now_ms)
    }

    /// Closes the window if it has elapsed. Yields the deadline and the level
    /// the window settled on.
    pub(super) fn take_due(&mut self, now_ms: u64) -> Option<(u64, bool)> {
        let deadline_ms = self.window.take_due(now_ms)?;
        Some((deadline_ms, self.pending_level))
    }

    pub(super) fn cancel(&mut self) {
        self.window.cancel();
    }

    pub(super) fn is_open(&self) -> bool {
        self.window.is_armed()
    }

    pub(super) fn deadline_ms(&self) -> Option<u64> {
        self.window.deadline_ms()
    }

    pub(super) fn pending_level(&self) -> bool {
        self.pending_level
    }
}
