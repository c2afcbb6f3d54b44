#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ArmedTimer {
    deadline_ms: u64,
    order: u64,
}

/// A single outstanding deadline. Arming always replaces the previous one.
///
/// Cancellation is synchronous: `cancel` and `arm` drop the old deadline
/// before returning, so a cancelled arming can never come out of
/// [`TimerSlot::take_due`].
#[derive(Clone, Copy, Debug, Default)]
pub(super) struct TimerSlot {
    armed: Option<ArmedTimer>,
}

impl TimerSlot {
    pub(super) const fn new() -> Self {
        Self { armed: None }
    }

    /// Arms the slot at `deadline_ms`. `order` breaks ties between slots
    /// that share a deadline: lower fires first.
    pub(super) fn arm(&mut self, deadline_ms: u64, order: u64) {
        self.cancel();
        self.armed = Some(ArmedTimer { deadline_ms, order });
    }

    pub(super) fn cancel(&mut self) {
        if let Some(armed) = self.armed.take() {
            log::trace!("button: timer at {} cancelled", armed.deadline_ms);
        }
    }

    pub(super) fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub(super) fn deadline_ms(&self) -> Option<u64> {
        self.armed.map(|armed| armed.deadline_ms)
    }

    pub(super) fn due_key(&self, now_ms: u64) -> Option<(u64, u64)> {
        self.armed
            .filter(|armed| armed.deadline_ms <= now_ms)
            .map(|armed| (armed.deadline_ms, armed.order))
    }

    /// Disarms the slot if its deadline has passed and returns that deadline.
    pub(super) fn take_due(&mut self, now_ms: u64) -> Option<u64> {
        let armed = self.armed.filter(|armed| armed.deadline_ms <= now_ms)?;
        self.armed = None;
        Some(armed.deadline_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_timer_fires_once() {
        let mut slot = TimerSlot::new();
        slot.arm(100, 0);
        assert_eq!(slot.take_due(99), None);

        assert_eq!(slot.take_due(100), Some(100));
        assert!(!slot.is_armed());
        assert_eq!(slot.take_due(200), None);
    }

    #[test]
    fn rearming_replaces_the_pending_deadline() {
        let mut slot = TimerSlot::new();
        slot.arm(100, 0);
        slot.arm(300, 1);

        assert_eq!(slot.take_due(299), None);
        assert_eq!(slot.take_due(1_000), Some(300));
    }

    #[test]
    fn cancelled_timer_never_becomes_due() {
        let mut slot = TimerSlot::new();
        slot.arm(50, 0);
        slot.cancel();
        assert!(!slot.is_armed());
        assert_eq!(slot.deadline_ms(), None);
        assert_eq!(slot.due_key(1_000), None);
        assert_eq!(slot.take_due(1_000), None);
    }

    #[test]
    fn due_key_orders_by_deadline_then_arming() {
        let mut a = TimerSlot::new();
        let mut b = TimerSlot::new();
        a.arm(100, 7);
        b.arm(100, 3);
        assert!(b.due_key(100) < a.due_key(100));
        assert_eq!(a.due_key(99), None);
    }
}
