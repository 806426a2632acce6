// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! One-shot search over a position built from a UI-facing move list; prints the chosen move and
//! its reported value.

use std::fs::File;

use structopt::StructOpt;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::FmtSubscriber;

use gomoku::engine::{Engine, EngineOptions};
use gomoku::journal::SearchJournalLayer;
use gomoku::log::{LogLevel, LogOptions};

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    match s.to_ascii_lowercase().as_str() {
        "off" => Ok(LogLevel::Off),
        "always" => Ok(LogLevel::Always),
        "warn" => Ok(LogLevel::Warn),
        "info" => Ok(LogLevel::Info),
        "debug" => Ok(LogLevel::Debug),
        other => Err(format!("unknown log level {other:?} (expected off/always/warn/info/debug)")),
    }
}

#[derive(Debug, StructOpt)]
struct Options {
    /// Board size, 6 <= size <= 20.
    #[structopt(short, long, default_value = "15")]
    size: u32,
    /// Whitespace-separated "x,y" moves, alternating sides starting with Black, e.g. "7,7 8,8".
    #[structopt(short, long, default_value = "")]
    moves: String,
    /// Per-move time budget, in milliseconds.
    #[structopt(long, default_value = "5000")]
    timeout_turn_ms: u64,
    /// If present, serializes the output as JSON instead of plain text.
    #[structopt(long)]
    json: bool,
    /// If present, appends a newline-delimited-JSON search trace to this file.
    #[structopt(long)]
    journal: Option<std::path::PathBuf>,
    /// Threshold for the internal per-node logger: off, always, warn, info, or debug.
    #[structopt(long, default_value = "off", parse(try_from_str = parse_log_level))]
    log_level: LogLevel,
    /// File the internal per-node logger appends to, if `--log-level` is above `off`.
    #[structopt(long)]
    log_file: Option<std::path::PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let ops = Options::from_args();

    let log_options = LogOptions {
        level: ops.log_level,
        log_file: ops.log_file.clone(),
        journal_file: ops.journal.clone(),
    };
    log_options.install()?;

    let subscriber = FmtSubscriber::builder().with_max_level(Level::WARN).finish();
    if let Some(path) = &ops.journal {
        let file = File::create(path)?;
        let subscriber = subscriber.with(SearchJournalLayer::new(file));
        tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
    } else {
        tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
    }

    let options = EngineOptions {
        board_size: ops.size,
        timeout_turn_ms: ops.timeout_turn_ms,
        ..EngineOptions::default()
    };
    let mut engine = Engine::new(options)?;
    engine.play_moves(&ops.moves)?;

    let best = engine.get_best_move();
    let (x, y) = best.to_ui();

    if ops.json {
        println!("{{\"x\": {x}, \"y\": {y}}}");
    } else {
        println!("{x},{y}");
    }

    Ok(())
}
