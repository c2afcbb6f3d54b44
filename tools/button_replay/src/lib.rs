use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use button_events::{ButtonConfig, ButtonEngine, ButtonEvent, DEFAULT_BUTTON_CONFIG};
use serde::Deserialize;

pub const TRACE_TAG: &str = "raw";
pub const DEFAULT_TAIL_MS: u64 = 1_000;

const KNOWN_EVENT_NAMES: [&str; 8] = [
    "level_changed",
    "level_press",
    "level_release",
    "pressed",
    "clicked",
    "clicked_pressed",
    "double_clicked",
    "released",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceSample {
    pub ms: u64,
    pub level: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayEvent {
    pub ms: u64,
    pub event: ButtonEvent,
}

impl ReplayEvent {
    pub fn is_gesture(&self) -> bool {
        self.event.gesture().is_some()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    use_pull_up: Option<bool>,
    debounce_ms: Option<u64>,
    press_ms: Option<u64>,
    click_ms: Option<u64>,
    initial_raw_level: Option<bool>,
}

impl ConfigFile {
    fn into_config(self) -> ButtonConfig {
        let defaults = DEFAULT_BUTTON_CONFIG;
        ButtonConfig {
            use_pull_up: self.use_pull_up.unwrap_or(defaults.use_pull_up),
            debounce_ms: self.debounce_ms.unwrap_or(defaults.debounce_ms),
            press_ms: self.press_ms.unwrap_or(defaults.press_ms),
            click_ms: self.click_ms.unwrap_or(defaults.click_ms),
            initial_raw_level: self.initial_raw_level.or(defaults.initial_raw_level),
        }
    }
}

/// Parses button timing from TOML. Missing keys keep their defaults.
pub fn parse_config(text: &str) -> Result<ButtonConfig> {
    let file: ConfigFile = toml::from_str(text).context("invalid button config")?;
    let config = file.into_config();
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: Option<&Path>) -> Result<ButtonConfig> {
    let Some(path) = path else {
        return Ok(DEFAULT_BUTTON_CONFIG);
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_config(&text).with_context(|| format!("in {}", path.display()))
}

/// Parses `raw,<ms>,<level>` lines. Blank lines and `#` comments are skipped.
pub fn parse_trace(text: &str) -> Result<Vec<TraceSample>> {
    let mut out: Vec<TraceSample> = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if parts.len() != 3 || parts[0] != TRACE_TAG {
            bail!("line {line_no}: expected `{TRACE_TAG},<ms>,<level>`, got `{trimmed}`");
        }

        let ms = parts[1]
            .parse::<u64>()
            .with_context(|| format!("line {line_no}: invalid ms '{}'", parts[1]))?;
        let level = match parts[2] {
            "0" => false,
            "1" => true,
            other => bail!("line {line_no}: invalid level '{other}', expected 0 or 1"),
        };

        if let Some(prev) = out.last() {
            if ms < prev.ms {
                bail!("line {line_no}: timestamp {ms} goes backwards from {}", prev.ms);
            }
        }
        out.push(TraceSample { ms, level });
    }
    Ok(out)
}

pub fn load_trace(path: &Path) -> Result<Vec<TraceSample>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_trace(&text).with_context(|| format!("in {}", path.display()))
}

/// Parses one event name per line.
pub fn parse_expected(text: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }
        let normalized = token.to_ascii_lowercase();
        if !KNOWN_EVENT_NAMES.contains(&normalized.as_str()) {
            bail!("line {}: unknown event name '{token}'", line_no + 1);
        }
        names.push(normalized);
    }
    Ok(names)
}

pub fn load_expected(path: &Path) -> Result<Vec<String>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_expected(&text).with_context(|| format!("in {}", path.display()))
}

/// Feeds `samples` through a fresh engine, firing deadlines the way a host
/// loop would, then idles for `tail_ms` so pending windows resolve.
pub fn replay(config: ButtonConfig, samples: &[TraceSample], tail_ms: u64) -> Result<Vec<ReplayEvent>> {
    let mut engine = ButtonEngine::new(config).map_err(|err| anyhow!(err))?;
    let mut events = Vec::new();

    for sample in samples {
        run_deadlines(&mut engine, sample.ms, &mut events);
        let output = engine.on_raw_level_change(sample.ms, sample.level);
        log::debug!(
            "t={} raw={} -> {}",
            sample.ms,
            u8::from(sample.level),
            output.disposition.as_str()
        );
        events.extend(output.events.into_iter().map(|event| ReplayEvent {
            ms: output.trace.now_ms.max(sample.ms),
            event,
        }));
    }

    let end_ms = samples
        .last()
        .map_or(0, |sample| sample.ms)
        .saturating_add(tail_ms);
    run_deadlines(&mut engine, end_ms, &mut events);

    if let Some(deadline) = engine.next_deadline_ms() {
        log::warn!("replay ended with a deadline still pending at {deadline} ms");
    }
    engine.disable();

    Ok(events)
}

fn run_deadlines(engine: &mut ButtonEngine, until_ms: u64, events: &mut Vec<ReplayEvent>) {
    while let Some(deadline) = engine.next_deadline_ms() {
        if deadline > until_ms {
            break;
        }
        let output = engine.poll(deadline);
        events.extend(
            output
                .events
                .into_iter()
                .map(|event| ReplayEvent { ms: deadline, event }),
        );
    }
}

pub fn event_names(events: &[ReplayEvent], all_events: bool) -> Vec<&'static str> {
    events
        .iter()
        .filter(|event| all_events || event.is_gesture())
        .map(|event| event.event.name())
        .collect()
}
