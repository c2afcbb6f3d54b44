use statig::prelude::*;

use super::types::{ButtonEvent, EventBuffer, Gesture, GestureStateId};

#[derive(Clone, Copy, Debug)]
pub(super) enum GestureHsmEvent {
    /// Start-up level read before any edge.
    Seed { pressed: bool },
    /// Accepted (debounced, polarity-corrected) level.
    Level { pressed: bool },
    PressTimer,
    ClickTimer,
    Disable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum EmitTimerKind {
    Press,
    Click,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum EmitTimerCommand {
    Arm {
        kind: EmitTimerKind,
        deadline_ms: u64,
    },
    Cancel,
}

#[derive(Debug, Default)]
pub(super) struct DispatchContext {
    pub(super) now_ms: u64,
    pub(super) events: EventBuffer,
    pub(super) emit_timer: Option<EmitTimerCommand>,
}

impl DispatchContext {
    pub(super) fn at(now_ms: u64) -> Self {
        Self {
            now_ms,
            ..Self::default()
        }
    }
}

pub(super) struct GestureHsm {
    press_ms: u64,
    click_ms: u64,
    pub(super) state_id: GestureStateId,
    pub(super) gestures_emitted: u32,
}

impl GestureHsm {
    pub(super) fn new(press_ms: u64, click_ms: u64) -> Self {
        Self {
            press_ms,
            click_ms,
            state_id: GestureStateId::Idle,
            gestures_emitted: 0,
        }
    }

    fn enter(&mut self, context: &DispatchContext, state_id: GestureStateId) {
        if self.state_id != state_id {
            log::debug!(
                "button: t={} state {:?} -> {:?}",
                context.now_ms,
                self.state_id,
                state_id
            );
        }
        self.state_id = state_id;
    }

    fn arm_press_timer(&self, context: &mut DispatchContext) {
        context.emit_timer = Some(EmitTimerCommand::Arm {
            kind: EmitTimerKind::Press,
            deadline_ms: context.now_ms.saturating_add(self.press_ms),
        });
    }

    fn arm_click_timer(&self, context: &mut DispatchContext) {
        context.emit_timer = Some(EmitTimerCommand::Arm {
            kind: EmitTimerKind::Click,
            deadline_ms: context.now_ms.saturating_add(self.click_ms),
        });
    }

    fn cancel_emit_timer(context: &mut DispatchContext) {
        context.emit_timer = Some(EmitTimerCommand::Cancel);
    }

    fn emit_gesture(&mut self, context: &mut DispatchContext, gesture: Gesture) {
        log::info!("button: t={} gesture={}", context.now_ms, gesture.name());
        self.gestures_emitted = self.gestures_emitted.wrapping_add(1);
        context.events.push(ButtonEvent::Gesture(gesture));
    }

    /// Arms a fresh press timer, replacing whatever emit timer was pending.
    fn restart_press(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        self.arm_press_timer(context);
        self.enter(context, GestureStateId::Pressed);
        Transition(State::pressed())
    }

    fn ignore(&self, context: &DispatchContext, event: &GestureHsmEvent) -> Outcome<State> {
        log::trace!(
            "button: t={} {:?} ignored in {:?}",
            context.now_ms,
            event,
            self.state_id
        );
        Handled
    }
}

#[state_machine(initial = "State::idle()")]
impl GestureHsm {
    #[state(superstate = "armed")]
    fn idle(&mut self, context: &mut DispatchContext, event: &GestureHsmEvent) -> Outcome<State> {
        match event {
            GestureHsmEvent::Level { pressed: true } => self.restart_press(context),
            GestureHsmEvent::Seed { pressed: true } => {
                self.enter(context, GestureStateId::ReleaseWait);
                Transition(State::release_wait())
            }
            GestureHsmEvent::Level { pressed: false }
            | GestureHsmEvent::PressTimer
            | GestureHsmEvent::ClickTimer => self.ignore(context, event),
            _ => Super,
        }
    }

    #[state(superstate = "armed")]
    fn pressed(&mut self, context: &mut DispatchContext, event: &GestureHsmEvent) -> Outcome<State> {
        match event {
            GestureHsmEvent::Level { pressed: false } => {
                self.arm_click_timer(context);
                self.enter(context, GestureStateId::Clicked);
                Transition(State::clicked())
            }
            GestureHsmEvent::PressTimer => {
                self.emit_gesture(context, Gesture::Pressed);
                self.enter(context, GestureStateId::ReleaseWait);
                Transition(State::release_wait())
            }
            // Another accepted press while down starts classification over.
            GestureHsmEvent::Level { pressed: true } => self.restart_press(context),
            GestureHsmEvent::ClickTimer => self.ignore(context, event),
            _ => Super,
        }
    }

    #[state(superstate = "armed")]
    fn clicked(&mut self, context: &mut DispatchContext, event: &GestureHsmEvent) -> Outcome<State> {
        match event {
            GestureHsmEvent::Level { pressed: true } => {
                // Replaces the pending click timer.
                self.arm_press_timer(context);
                self.enter(context, GestureStateId::ClickedPressed);
                Transition(State::clicked_pressed())
            }
            GestureHsmEvent::ClickTimer => {
                self.emit_gesture(context, Gesture::Clicked);
                self.enter(context, GestureStateId::Idle);
                Transition(State::idle())
            }
            GestureHsmEvent::Level { pressed: false } | GestureHsmEvent::PressTimer => {
                self.ignore(context, event)
            }
            _ => Super,
        }
    }

    #[state(superstate = "armed")]
    fn clicked_pressed(
        &mut self,
        context: &mut DispatchContext,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        match event {
            GestureHsmEvent::Level { pressed: false } => {
                Self::cancel_emit_timer(context);
                self.enter(context, GestureStateId::DoubleClicked);
                self.emit_gesture(context, Gesture::DoubleClicked);
                self.enter(context, GestureStateId::Idle);
                Transition(State::idle())
            }
            GestureHsmEvent::PressTimer => {
                self.emit_gesture(context, Gesture::ClickedPressed);
                self.enter(context, GestureStateId::ReleaseWait);
                Transition(State::release_wait())
            }
            GestureHsmEvent::Level { pressed: true } => self.restart_press(context),
            GestureHsmEvent::ClickTimer => self.ignore(context, event),
            _ => Super,
        }
    }

    #[state(superstate = "armed")]
    fn release_wait(
        &mut self,
        context: &mut DispatchContext,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        match event {
            GestureHsmEvent::Level { pressed: false } => {
                Self::cancel_emit_timer(context);
                self.emit_gesture(context, Gesture::Released);
                self.enter(context, GestureStateId::Idle);
                Transition(State::idle())
            }
            GestureHsmEvent::Level { pressed: true } => self.restart_press(context),
            GestureHsmEvent::PressTimer | GestureHsmEvent::ClickTimer => {
                self.ignore(context, event)
            }
            _ => Super,
        }
    }

    #[state]
    fn disabled(&mut self, context: &mut DispatchContext, event: &GestureHsmEvent) -> Outcome<State> {
        self.ignore(context, event)
    }

    #[superstate]
    fn armed(&mut self, context: &mut DispatchContext, event: &GestureHsmEvent) -> Outcome<State> {
        match event {
            GestureHsmEvent::Disable => {
                Self::cancel_emit_timer(context);
                self.enter(context, GestureStateId::Disabled);
                Transition(State::disabled())
            }
            // Seeding only means something before the first edge, in `idle`.
            _ => self.ignore(context, event),
        }
    }
}
