use std::{path::PathBuf, process};

use anyhow::{bail, Result};
use button_replay::{
    event_names, load_config, load_expected, load_trace, replay, DEFAULT_TAIL_MS,
};
use clap::Parser;
use log::{LevelFilter, Log, Metadata, Record};

#[derive(Debug, Parser)]
#[command(
    name = "button_replay",
    about = "Replay a recorded raw button trace through the gesture engine"
)]
struct Cli {
    /// Trace file with `raw,<ms>,<level>` lines.
    trace: PathBuf,
    /// TOML file overriding button timing.
    #[arg(long)]
    config: Option<PathBuf>,
    /// File listing the expected event names, one per line.
    #[arg(long)]
    expect: Option<PathBuf>,
    /// Idle time appended after the last sample.
    #[arg(long, default_value_t = DEFAULT_TAIL_MS)]
    tail_ms: u64,
    /// Print and compare low-level events too, not just gestures.
    #[arg(long)]
    all_events: bool,
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() {
    let cli = Cli::parse();
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(cli.log_level);
    }

    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let samples = load_trace(&cli.trace)?;
    log::info!(
        "replaying {} samples debounce={}ms press={}ms click={}ms",
        samples.len(),
        config.debounce_ms,
        config.press_ms,
        config.click_ms
    );

    let events = replay(config, &samples, cli.tail_ms)?;

    println!("event,ms,name");
    for event in events
        .iter()
        .filter(|event| cli.all_events || event.is_gesture())
    {
        println!("event,{},{}", event.ms, event.event.name());
    }

    if let Some(expect_path) = cli.expect {
        let expected = load_expected(&expect_path)?;
        let actual = event_names(&events, cli.all_events);
        if actual != expected {
            eprintln!("expected: {}", expected.join(","));
            eprintln!("actual:   {}", actual.join(","));
            bail!("event sequence mismatch");
        }
    }

    Ok(())
}
