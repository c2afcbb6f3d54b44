use embassy_futures::select::{select, Either};
use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    channel::{Receiver, Sender},
};
use embassy_time::{Instant, Timer};

use super::{
    engine::ButtonEngine,
    types::{ButtonEvent, EventBuffer},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawLevelSample {
    pub t_ms: u64,
    pub level: bool,
}

impl RawLevelSample {
    /// Stamps `level` with the embassy clock, the same clock deadlines are awaited on.
    pub fn now(level: bool) -> Self {
        Self {
            t_ms: Instant::now().as_millis(),
            level,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonInput {
    Level(RawLevelSample),
    Disable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonEventFrame {
    pub t_ms: u64,
    pub event: ButtonEvent,
}

/// Runs one button until a [`ButtonInput::Disable`] arrives.
///
/// Raw edges come in through `inputs`; while a deadline is pending the loop
/// also sleeps until it. Every event is forwarded in order, stamped with the
/// time of the dispatch that produced it. Returns the torn-down engine.
pub async fn run_button<'ch, M: RawMutex, const IN: usize, const OUT: usize>(
    mut engine: ButtonEngine,
    inputs: Receiver<'ch, M, ButtonInput, IN>,
    events: Sender<'ch, M, ButtonEventFrame, OUT>,
) -> ButtonEngine {
    loop {
        let input = match engine.next_deadline_ms() {
            Some(deadline_ms) => {
                match select(
                    inputs.receive(),
                    Timer::at(Instant::from_millis(deadline_ms)),
                )
                .await
                {
                    Either::First(input) => input,
                    Either::Second(()) => {
                        let output = engine.poll(deadline_ms);
                        forward(&events, output.trace.now_ms, output.events).await;
                        continue;
                    }
                }
            }
            None => inputs.receive().await,
        };

        match input {
            ButtonInput::Level(sample) => {
                let output = engine.on_raw_level_change(sample.t_ms, sample.level);
                forward(&events, output.trace.now_ms.max(sample.t_ms), output.events).await;
            }
            ButtonInput::Disable => {
                engine.disable();
                log::debug!("button: task stopped");
                return engine;
            }
        }
    }
}

async fn forward<M: RawMutex, const OUT: usize>(
    events: &Sender<'_, M, ButtonEventFrame, OUT>,
    t_ms: u64,
    buffer: EventBuffer,
) {
    // Order matters to consumers; block rather than drop.
    for event in buffer {
        events.send(ButtonEventFrame { t_ms, event }).await;
    }
}

#[cfg(test)]
mod tests;
