use embassy_futures::{block_on, join::join};
use embassy_sync::{blocking_mutex::raw::NoopRawMutex, channel::Channel};
use embassy_time::{Duration, MockDriver};

use super::*;
use crate::button::{
    config::DEFAULT_BUTTON_CONFIG,
    types::{Gesture, GestureStateId},
};

type Inputs = Channel<NoopRawMutex, ButtonInput, 4>;
type Frames = Channel<NoopRawMutex, ButtonEventFrame, 16>;

fn engine() -> ButtonEngine {
    ButtonEngine::new(DEFAULT_BUTTON_CONFIG.with_debounce_ms(0)).expect("config should be valid")
}

fn frame(t_ms: u64, event: ButtonEvent) -> ButtonEventFrame {
    ButtonEventFrame { t_ms, event }
}

// The mock clock is process-global, so both scenarios share one test.
#[test]
fn task_wakes_for_deadlines_and_stops_on_disable() {
    let driver = MockDriver::get();

    // Disable with a press timer pending: nothing fires afterwards.
    driver.reset();
    let inputs = Inputs::new();
    let frames = Frames::new();
    let (stopped, received) = block_on(join(
        run_button(engine(), inputs.receiver(), frames.sender()),
        async {
            // Pull-up wiring: low means pressed.
            inputs.send(ButtonInput::Level(RawLevelSample::now(false))).await;
            let received = [frames.receive().await, frames.receive().await];
            inputs.send(ButtonInput::Disable).await;
            received
        },
    ));
    assert_eq!(
        received,
        [
            frame(0, ButtonEvent::LevelChanged { pressed: true }),
            frame(0, ButtonEvent::LevelPress),
        ]
    );
    assert!(stopped.is_disabled());
    assert_eq!(stopped.next_deadline_ms(), None);
    driver.advance(Duration::from_millis(500));
    assert!(frames.try_receive().is_err());

    // Deadline wakeup: the press timer fires without any further input.
    driver.reset();
    let inputs = Inputs::new();
    let frames = Frames::new();
    let (stopped, received) = block_on(join(
        run_button(engine(), inputs.receiver(), frames.sender()),
        async {
            inputs.send(ButtonInput::Level(RawLevelSample::now(false))).await;
            frames.receive().await;
            frames.receive().await;

            driver.advance(Duration::from_millis(250));
            let pressed = frames.receive().await;
            inputs.send(ButtonInput::Disable).await;
            pressed
        },
    ));
    assert_eq!(received, frame(200, ButtonEvent::Gesture(Gesture::Pressed)));
    assert_eq!(stopped.state(), GestureStateId::Disabled);
    assert_eq!(stopped.trace().gestures_emitted, 1);
}
