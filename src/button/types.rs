/// One of the five classified user actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    Pressed,
    Clicked,
    ClickedPressed,
    DoubleClicked,
    Released,
}

impl Gesture {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pressed => "pressed",
            Self::Clicked => "clicked",
            Self::ClickedPressed => "clicked_pressed",
            Self::DoubleClicked => "double_clicked",
            Self::Released => "released",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pressed" => Some(Self::Pressed),
            "clicked" => Some(Self::Clicked),
            "clicked_pressed" => Some(Self::ClickedPressed),
            "double_clicked" => Some(Self::DoubleClicked),
            "released" => Some(Self::Released),
            _ => None,
        }
    }
}

/// Everything the engine reports, in emission order.
///
/// Low-level notifications for an accepted transition always precede the
/// gesture it resolves. A `Gesture` entry stands for both the gesture-specific
/// event and the unified `gesture` event carrying its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    LevelChanged { pressed: bool },
    LevelPress,
    LevelRelease,
    Gesture(Gesture),
}

impl ButtonEvent {
    pub const GESTURE_EVENT_NAME: &'static str = "gesture";

    pub const fn name(self) -> &'static str {
        match self {
            Self::LevelChanged { .. } => "level_changed",
            Self::LevelPress => "level_press",
            Self::LevelRelease => "level_release",
            Self::Gesture(gesture) => gesture.name(),
        }
    }

    pub const fn gesture(self) -> Option<Gesture> {
        match self {
            Self::Gesture(gesture) => Some(gesture),
            _ => None,
        }
    }
}

/// What `on_raw_level_change` did with an edge. Informational only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebounceDisposition {
    /// Engine was torn down; the edge was dropped.
    RejectedDisabled,
    /// A debounce window is already open; the edge only updated the pending level.
    Debounced,
    /// Debounce is off; the edge went straight to the gesture machine.
    AcceptedImmediate,
    /// The edge opened a debounce window.
    AcceptedScheduled,
}

impl DebounceDisposition {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RejectedDisabled => "disabled",
            Self::Debounced => "debounced",
            Self::AcceptedImmediate => "final",
            Self::AcceptedScheduled => "accepted",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GestureStateId {
    Disabled = 0,
    #[default]
    Idle = 1,
    Pressed = 2,
    Clicked = 3,
    ClickedPressed = 4,
    DoubleClicked = 5,
    ReleaseWait = 6,
}

impl GestureStateId {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Why the last state-machine dispatch happened.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DispatchCause {
    #[default]
    None = 0,
    Seed = 1,
    Press = 2,
    Release = 3,
    PressTimer = 4,
    ClickTimer = 5,
    Disable = 6,
}

impl DispatchCause {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

const EVENT_BUFFER_MAX: usize = 8;

/// Bounded, ordered event output of one engine call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventBuffer {
    events: heapless::Vec<ButtonEvent, EVENT_BUFFER_MAX>,
}

impl EventBuffer {
    /// One `poll` can resolve a debounce window and the press window armed by it.
    pub const MAX: usize = EVENT_BUFFER_MAX;

    pub const fn new() -> Self {
        Self {
            events: heapless::Vec::new(),
        }
    }

    pub fn push(&mut self, event: ButtonEvent) {
        if self.events.push(event).is_err() {
            log::warn!("button: event buffer full, dropped {}", event.name());
        }
    }

    pub fn extend_from(&mut self, other: &EventBuffer) {
        for event in other.iter() {
            self.push(*event);
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ButtonEvent> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[ButtonEvent] {
        &self.events
    }

    pub fn gestures(&self) -> impl Iterator<Item = Gesture> + '_ {
        self.iter().filter_map(|event| event.gesture())
    }

    pub fn contains_gesture(&self, gesture: Gesture) -> bool {
        self.gestures().any(|item| item == gesture)
    }
}

impl IntoIterator for EventBuffer {
    type Item = ButtonEvent;
    type IntoIter = <heapless::Vec<ButtonEvent, EVENT_BUFFER_MAX> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gesture_names_round_trip_through_lookup() {
        for gesture in [
            Gesture::Pressed,
            Gesture::Clicked,
            Gesture::ClickedPressed,
            Gesture::DoubleClicked,
            Gesture::Released,
        ] {
            assert_eq!(Gesture::from_name(gesture.name()), Some(gesture));
        }
        assert_eq!(Gesture::from_name("level_press"), None);
    }

    #[test]
    fn buffer_keeps_order_and_drops_overflow() {
        let mut buffer = EventBuffer::new();
        buffer.push(ButtonEvent::LevelChanged { pressed: false });
        buffer.push(ButtonEvent::LevelRelease);
        buffer.push(ButtonEvent::Gesture(Gesture::Released));
        assert_eq!(
            buffer.as_slice(),
            &[
                ButtonEvent::LevelChanged { pressed: false },
                ButtonEvent::LevelRelease,
                ButtonEvent::Gesture(Gesture::Released),
            ]
        );
        assert!(buffer.contains_gesture(Gesture::Released));

        for _ in 0..EventBuffer::MAX {
            buffer.push(ButtonEvent::LevelPress);
        }
        assert_eq!(buffer.len(), EventBuffer::MAX);
    }
}
