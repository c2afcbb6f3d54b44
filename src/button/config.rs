use core::fmt;

/// Longest debounce, press or click window accepted at construction.
pub const MAX_WINDOW_MS: u64 = 60_000;

/// Timing and wiring for one button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonConfig {
    /// Pin is pulled up, so a raw low reading means "pressed".
    pub use_pull_up: bool,
    /// Quiet period used to coalesce raw chatter. Zero passes every edge through.
    pub debounce_ms: u64,
    /// How long a press must be held before it is reported as `pressed`.
    pub press_ms: u64,
    /// How long after a release we wait for a second press before reporting `clicked`.
    pub click_ms: u64,
    /// Raw pin level read before the first edge, used to seed the machine.
    pub initial_raw_level: Option<bool>,
}

impl ButtonConfig {
    pub const fn defaults() -> Self {
        Self {
            use_pull_up: true,
            debounce_ms: 30,
            press_ms: 200,
            click_ms: 200,
            initial_raw_level: None,
        }
    }

    pub const fn with_pull_up(mut self, use_pull_up: bool) -> Self {
        self.use_pull_up = use_pull_up;
        self
    }

    pub const fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub const fn with_press_ms(mut self, press_ms: u64) -> Self {
        self.press_ms = press_ms;
        self
    }

    pub const fn with_click_ms(mut self, click_ms: u64) -> Self {
        self.click_ms = click_ms;
        self
    }

    pub const fn with_initial_raw_level(mut self, raw_level: bool) -> Self {
        self.initial_raw_level = Some(raw_level);
        self
    }

    /// Polarity-corrected level: `true` means the button is held.
    pub const fn logical_level(&self, raw_level: bool) -> bool {
        if self.use_pull_up {
            !raw_level
        } else {
            raw_level
        }
    }

    /// Logical level implied by `initial_raw_level`; unseeded buttons start released.
    pub const fn initial_logical_level(&self) -> bool {
        match self.initial_raw_level {
            Some(raw_level) => self.logical_level(raw_level),
            None => false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.press_ms == 0 {
            return Err(ConfigError::ZeroPressWindow);
        }
        if self.click_ms == 0 {
            return Err(ConfigError::ZeroClickWindow);
        }

        for (window, ms) in [
            (TimingWindow::Debounce, self.debounce_ms),
            (TimingWindow::Press, self.press_ms),
            (TimingWindow::Click, self.click_ms),
        ] {
            if ms > MAX_WINDOW_MS {
                return Err(ConfigError::WindowTooLong { window, ms });
            }
        }

        Ok(())
    }
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

pub const DEFAULT_BUTTON_CONFIG: ButtonConfig = ButtonConfig::defaults();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingWindow {
    Debounce,
    Press,
    Click,
}

impl TimingWindow {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debounce => "debounce",
            Self::Press => "press",
            Self::Click => "click",
        }
    }
}

/// Rejected configuration. Reported by [`ButtonConfig::validate`] and at engine construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    ZeroPressWindow,
    ZeroClickWindow,
    WindowTooLong { window: TimingWindow, ms: u64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPressWindow => f.write_str("press window must be non-zero"),
            Self::ZeroClickWindow => f.write_str("click window must be non-zero"),
            Self::WindowTooLong { window, ms } => write!(
                f,
                "{} window of {ms} ms exceeds {MAX_WINDOW_MS} ms",
                window.as_str()
            ),
        }
    }
}

impl core::error::Error for ConfigError {}
