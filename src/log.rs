// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A global, atomically-gated leveled logger for unconditionally-cheap diagnostics inside the
//! alpha-beta loop, where even a `tracing` span's overhead is unwelcome per node. Disabled by
//! default; costs one atomic load per call site when off.
//!
//! This is deliberately a second mechanism alongside [`crate::journal`]'s `tracing` spans, not a
//! replacement for it: the journal captures the shape of a search (depth boundaries, termination),
//! while this one is for "what is node N doing right now", cheap enough to leave compiled in.

use std::fmt::Arguments;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// A logging threshold. Ordered `Off < Always < Warn < Info < Debug`: setting the logger to a level
/// admits every message at that level or below it in verbosity, i.e. `Debug` lets everything
/// through and `Off` lets nothing through, including `Always`-level messages.
#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off = 0,
    Always = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl Default for LogLevel {
    fn default() -> LogLevel {
        LogLevel::Off
    }
}

struct Logger {
    level: AtomicU8,
    file: Mutex<Option<File>>,
}

static LOGGER: Logger = Logger {
    level: AtomicU8::new(LogLevel::Off as u8),
    file: Mutex::new(None),
};

/// Opens `path` for appending and makes it the logger's destination, replacing (and flushing)
/// whatever file was previously installed.
pub fn set_file(path: &std::path::Path) -> io::Result<()> {
    let file = File::options().create(true).append(true).open(path)?;
    let mut logger_file = LOGGER.file.lock().unwrap();
    if let Some(old_file) = logger_file.replace(file) {
        old_file.sync_all()?;
    }
    Ok(())
}

pub fn set_level(level: LogLevel) {
    LOGGER.level.store(level as u8, Ordering::Release);
}

pub fn level() -> LogLevel {
    match LOGGER.level.load(Ordering::Acquire) {
        0 => LogLevel::Off,
        1 => LogLevel::Always,
        2 => LogLevel::Warn,
        3 => LogLevel::Info,
        _ => LogLevel::Debug,
    }
}

/// Writes `args` to the installed log file if `level` is at or below the configured threshold.
/// A message with no file installed is silently dropped rather than buffered.
pub fn log(level: LogLevel, args: Arguments<'_>) {
    if LOGGER.level.load(Ordering::Acquire) < level as u8 {
        return;
    }
    let mut file = LOGGER.file.lock().unwrap();
    if let Some(ref mut file) = *file {
        let _ = writeln!(file, "{}", args);
    }
}

/// Per-run logging configuration: the threshold and where the file-backed logger writes. Plain
/// data, parsed by the demonstration binaries from `structopt` flags or a config file; does
/// nothing on its own until [`LogOptions::install`] applies it to the global logger.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LogOptions {
    pub level: LogLevel,
    pub log_file: Option<PathBuf>,
    /// Path a `SearchJournalLayer` should be attached to, if the caller wants one. `log`/`LogOptions`
    /// don't write this file themselves — they just carry the path alongside the logger's own
    /// settings so a binary can configure both from one parsed struct.
    pub journal_file: Option<PathBuf>,
}

impl LogOptions {
    /// Applies `level` and `log_file` to the global logger. Idempotent; call again after changing
    /// either field to push the update through.
    pub fn install(&self) -> io::Result<()> {
        set_level(self.level);
        if let Some(path) = &self.log_file {
            set_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    // The logger is a single global, so tests that mutate it serialize on this lock rather than
    // racing each other's `set_level`/`set_file` calls.
    static GUARD: StdMutex<()> = StdMutex::new(());

    #[test]
    fn a_message_below_the_configured_level_is_dropped() {
        let _guard = GUARD.lock().unwrap();
        let dir = std::env::temp_dir();
        let path = dir.join(format!("gomoku-log-test-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);

        set_level(LogLevel::Warn);
        set_file(&path).unwrap();
        log(LogLevel::Debug, format_args!("should not appear"));
        log(LogLevel::Warn, format_args!("should appear"));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("should not appear"));
        assert!(contents.contains("should appear"));

        set_level(LogLevel::Off);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn off_drops_even_always_level_messages() {
        let _guard = GUARD.lock().unwrap();
        let dir = std::env::temp_dir();
        let path = dir.join(format!("gomoku-log-test-off-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);

        set_level(LogLevel::Off);
        set_file(&path).unwrap();
        log(LogLevel::Always, format_args!("should not appear either"));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("should not appear"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn log_options_round_trip_through_json() {
        let options = LogOptions {
            level: LogLevel::Info,
            log_file: Some(PathBuf::from("search.log")),
            journal_file: None,
        };
        let json = serde_json::to_string(&options).unwrap();
        let decoded: LogOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.level, options.level);
        assert_eq!(decoded.log_file, options.log_file);
        assert_eq!(decoded.journal_file, options.journal_file);
    }
}
