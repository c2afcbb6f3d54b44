use super::{
    config::{ButtonConfig, ConfigError},
    engine::ButtonEngine,
    types::{ButtonEvent, DebounceDisposition, EventBuffer, Gesture},
};

/// Typed listener for engine output. Every method defaults to doing nothing,
/// so consumers override only what they care about.
///
/// For each gesture the specific callback runs first, then [`on_gesture`].
///
/// [`on_gesture`]: ButtonObserver::on_gesture
pub trait ButtonObserver {
    fn on_level_changed(&mut self, _pressed: bool) {}
    fn on_level_press(&mut self) {}
    fn on_level_release(&mut self) {}

    fn on_pressed(&mut self) {}
    fn on_clicked(&mut self) {}
    fn on_clicked_pressed(&mut self) {}
    fn on_double_clicked(&mut self) {}
    fn on_released(&mut self) {}

    /// Unified gesture event, fired alongside every gesture-specific one.
    fn on_gesture(&mut self, _gesture: Gesture) {}
}

pub fn notify<O: ButtonObserver + ?Sized>(observer: &mut O, events: &EventBuffer) {
    for event in events.iter() {
        match *event {
            ButtonEvent::LevelChanged { pressed } => observer.on_level_changed(pressed),
            ButtonEvent::LevelPress => observer.on_level_press(),
            ButtonEvent::LevelRelease => observer.on_level_release(),
            ButtonEvent::Gesture(gesture) => {
                match gesture {
                    Gesture::Pressed => observer.on_pressed(),
                    Gesture::Clicked => observer.on_clicked(),
                    Gesture::ClickedPressed => observer.on_clicked_pressed(),
                    Gesture::DoubleClicked => observer.on_double_clicked(),
                    Gesture::Released => observer.on_released(),
                }
                observer.on_gesture(gesture);
            }
        }
    }
}

/// An engine bundled with the observer it reports to.
pub struct ObservedButton<O: ButtonObserver> {
    engine: ButtonEngine,
    observer: Option<O>,
}

impl<O: ButtonObserver> ObservedButton<O> {
    pub fn new(config: ButtonConfig, observer: O) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: ButtonEngine::new(config)?,
            observer: Some(observer),
        })
    }

    pub fn engine(&self) -> &ButtonEngine {
        &self.engine
    }

    pub fn observer(&self) -> Option<&O> {
        self.observer.as_ref()
    }

    pub fn on_raw_level_change(&mut self, now_ms: u64, raw_level: bool) -> DebounceDisposition {
        let output = self.engine.on_raw_level_change(now_ms, raw_level);
        self.deliver(&output.events);
        output.disposition
    }

    pub fn poll(&mut self, now_ms: u64) {
        let output = self.engine.poll(now_ms);
        self.deliver(&output.events);
    }

    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.engine.next_deadline_ms()
    }

    /// Tears the engine down and detaches the observer, handing it back.
    pub fn disable(&mut self) -> Option<O> {
        self.engine.disable();
        self.observer.take()
    }

    fn deliver(&mut self, events: &EventBuffer) {
        if let Some(observer) = self.observer.as_mut() {
            notify(observer, events);
        }
    }
}
