use statig::blocking::IntoStateMachineExt as _;

use super::{
    config::{ButtonConfig, ConfigError},
    debounce::{DebounceFilter, DebounceStep},
    gesture_hsm::{DispatchContext, EmitTimerCommand, EmitTimerKind, GestureHsm, GestureHsmEvent},
    timer::TimerSlot,
    trace::EngineTraceSample,
    types::{ButtonEvent, DebounceDisposition, DispatchCause, EventBuffer, GestureStateId},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineOutput {
    pub events: EventBuffer,
    pub trace: EngineTraceSample,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawLevelOutput {
    pub disposition: DebounceDisposition,
    pub events: EventBuffer,
    pub trace: EngineTraceSample,
}

/// Debounce filter plus gesture machine for a single button.
///
/// Time is supplied by the caller. Deadlines are held internally; the host
/// wakes up at [`ButtonEngine::next_deadline_ms`] and calls
/// [`ButtonEngine::poll`]. Inbound edges fire any timers that are already due
/// before they are processed.
pub struct ButtonEngine {
    config: ButtonConfig,
    debounce: DebounceFilter,
    emit_timer: TimerSlot,
    emit_kind: Option<EmitTimerKind>,
    accepted_level: bool,
    next_order: u64,
    machine: statig::blocking::StateMachine<GestureHsm>,
    last_trace: EngineTraceSample,
}

impl ButtonEngine {
    pub fn new(config: ButtonConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let initial_level = config.initial_logical_level();
        let mut engine = Self {
            config,
            debounce: DebounceFilter::new(config.debounce_ms, initial_level),
            emit_timer: TimerSlot::new(),
            emit_kind: None,
            accepted_level: initial_level,
            next_order: 0,
            machine: GestureHsm::new(config.press_ms, config.click_ms).state_machine(),
            last_trace: EngineTraceSample::default(),
        };

        if config.initial_raw_level.is_some() {
            let mut discarded = EventBuffer::new();
            engine.dispatch(
                0,
                GestureHsmEvent::Seed {
                    pressed: initial_level,
                },
                DispatchCause::Seed,
                &mut discarded,
            );
        }
        engine.refresh_trace(0, DispatchCause::None);

        Ok(engine)
    }

    pub fn config(&self) -> &ButtonConfig {
        &self.config
    }

    pub fn state(&self) -> GestureStateId {
        self.machine.inner().state_id
    }

    pub fn is_disabled(&self) -> bool {
        self.state() == GestureStateId::Disabled
    }

    /// Last level accepted by the debounce filter.
    pub fn logical_level(&self) -> bool {
        self.accepted_level
    }

    /// Most recent polarity-corrected raw level, including one still being debounced.
    pub fn pending_level(&self) -> bool {
        self.debounce.pending_level()
    }

    pub fn is_debouncing(&self) -> bool {
        self.debounce.is_open()
    }

    pub fn trace(&self) -> EngineTraceSample {
        self.last_trace
    }

    pub fn next_deadline_ms(&self) -> Option<u64> {
        if self.is_disabled() {
            return None;
        }
        match (self.debounce.deadline_ms(), self.emit_timer.deadline_ms()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Feeds one raw pin edge observed at `now_ms`.
    pub fn on_raw_level_change(&mut self, now_ms: u64, raw_level: bool) -> RawLevelOutput {
        let mut events = EventBuffer::new();
        if self.is_disabled() {
            log::warn!("button: t={} raw edge after teardown rejected", now_ms);
            return RawLevelOutput {
                disposition: DebounceDisposition::RejectedDisabled,
                events,
                trace: self.last_trace,
            };
        }

        self.fire_due(now_ms, &mut events);

        let level = self.config.logical_level(raw_level);
        let order = self.take_order();
        let disposition = match self.debounce.on_level(now_ms, level, order) {
            DebounceStep::Pass(level) => {
                self.accept_level(now_ms, level, &mut events);
                DebounceDisposition::AcceptedImmediate
            }
            DebounceStep::Opened => {
                self.refresh_trace(now_ms, self.last_trace.cause);
                DebounceDisposition::AcceptedScheduled
            }
            DebounceStep::Coalesced => DebounceDisposition::Debounced,
        };

        RawLevelOutput {
            disposition,
            events,
            trace: self.last_trace,
        }
    }

    /// Fires every timer due at or before `now_ms`, oldest deadline first.
    pub fn poll(&mut self, now_ms: u64) -> EngineOutput {
        let mut events = EventBuffer::new();
        if !self.is_disabled() {
            self.fire_due(now_ms, &mut events);
        }
        EngineOutput {
            events,
            trace: self.last_trace,
        }
    }

    /// Tears the engine down. Cancels both timers; later edges are rejected.
    pub fn disable(&mut self) {
        if self.is_disabled() {
            return;
        }
        let now_ms = self.last_trace.now_ms;
        self.debounce.cancel();
        let mut discarded = EventBuffer::new();
        self.dispatch(
            now_ms,
            GestureHsmEvent::Disable,
            DispatchCause::Disable,
            &mut discarded,
        );
        self.emit_timer.cancel();
        self.emit_kind = None;
        self.refresh_trace(now_ms, DispatchCause::Disable);
    }

    fn take_order(&mut self) -> u64 {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);
        order
    }

    fn fire_due(&mut self, now_ms: u64, events: &mut EventBuffer) {
        loop {
            let debounce_key = self.debounce.due_key(now_ms);
            let emit_key = self.emit_timer.due_key(now_ms);
            match (debounce_key, emit_key) {
                (None, None) => break,
                (Some(debounce), Some(emit)) if emit < debounce => self.fire_emit(now_ms, events),
                (Some(_), _) => self.fire_debounce(now_ms, events),
                (None, Some(_)) => self.fire_emit(now_ms, events),
            }
        }
    }

    fn fire_debounce(&mut self, now_ms: u64, events: &mut EventBuffer) {
        if let Some((deadline_ms, level)) = self.debounce.take_due(now_ms) {
            self.accept_level(deadline_ms, level, events);
        }
    }

    fn fire_emit(&mut self, now_ms: u64, events: &mut EventBuffer) {
        let Some(deadline_ms) = self.emit_timer.take_due(now_ms) else {
            return;
        };
        let (event, cause) = match self.emit_kind.take() {
            Some(EmitTimerKind::Press) => (GestureHsmEvent::PressTimer, DispatchCause::PressTimer),
            Some(EmitTimerKind::Click) => (GestureHsmEvent::ClickTimer, DispatchCause::ClickTimer),
            None => return,
        };
        self.dispatch(deadline_ms, event, cause, events);
    }

    fn accept_level(&mut self, now_ms: u64, level: bool, events: &mut EventBuffer) {
        log::debug!("button: t={} accepted level pressed={}", now_ms, level);
        self.accepted_level = level;
        events.push(ButtonEvent::LevelChanged { pressed: level });
        let (event, cause) = if level {
            events.push(ButtonEvent::LevelPress);
            (GestureHsmEvent::Level { pressed: true }, DispatchCause::Press)
        } else {
            events.push(ButtonEvent::LevelRelease);
            (GestureHsmEvent::Level { pressed: false }, DispatchCause::Release)
        };
        self.dispatch(now_ms, event, cause, events);
    }

    fn dispatch(
        &mut self,
        now_ms: u64,
        event: GestureHsmEvent,
        cause: DispatchCause,
        events: &mut EventBuffer,
    ) {
        let mut context = DispatchContext::at(now_ms);
        self.machine.handle_with_context(&event, &mut context);

        match context.emit_timer {
            Some(EmitTimerCommand::Arm { kind, deadline_ms }) => {
                let order = self.take_order();
                self.emit_timer.arm(deadline_ms, order);
                self.emit_kind = Some(kind);
            }
            Some(EmitTimerCommand::Cancel) => {
                self.emit_timer.cancel();
                self.emit_kind = None;
            }
            None => {}
        }

        events.extend_from(&context.events);
        self.refresh_trace(now_ms, cause);
    }

    fn refresh_trace(&mut self, now_ms: u64, cause: DispatchCause) {
        let inner = self.machine.inner();
        self.last_trace = EngineTraceSample {
            now_ms,
            state_id: inner.state_id,
            cause,
            logical_level: self.accepted_level,
            debouncing: self.debounce.is_open(),
            debounce_deadline_ms: self.debounce.deadline_ms(),
            emit_deadline_ms: self.emit_timer.deadline_ms(),
            gestures_emitted: inner.gestures_emitted,
        };
    }
}
