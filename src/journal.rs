// Copyright 2021-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `journal` module interfaces with the `tracing` crate to capture a search's span tree as
//! newline-delimited JSON, for offline analysis by `gomoku-analyze` when the live search is
//! otherwise too fast and too deep to watch by eye.

pub mod constants;

use std::collections::HashMap;
use std::fmt::Debug;
use std::io::Write;
use std::sync::Mutex;
use std::time::SystemTime;

use derive_more::From;
use serde::Serialize;
use tracing::field::{Field, Visit};
use tracing::span::Attributes;
use tracing::{Event, Id, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use constants::{SEARCH, SEARCH_AT_DEPTH, SEARCH_TERMINATION_EVENT};

#[derive(Debug, Serialize)]
pub struct JournalEvent {
    timestamp: SystemTime,
    #[serde(flatten)]
    kind: JournalEventKind,
}

#[derive(Debug, Serialize, From)]
#[serde(tag = "event")]
pub enum JournalEventKind {
    SearchStart(SearchStartEvent),
    SearchEnd(SearchEndEvent),
    DepthStart(DepthStartEvent),
    DepthEnd(DepthEndEvent),
    Termination(TerminationEvent),
}

#[derive(Debug, Serialize)]
pub struct SearchStartEvent {
    id: u64,
    board_size: u32,
    zkey: u64,
}

#[derive(Debug, Serialize)]
pub struct SearchEndEvent {
    id: u64,
}

#[derive(Debug, Serialize)]
pub struct DepthStartEvent {
    id: u64,
    depth: u32,
    zkey: u64,
}

#[derive(Debug, Serialize)]
pub struct DepthEndEvent {
    id: u64,
}

#[derive(Debug, Serialize)]
pub struct TerminationEvent {
    reason: String,
}

/// A [`Layer`] that understands only the span/event names `crate::search` emits and writes one JSON
/// object per line to `writer` for each one. Unrelated spans and events (anything this crate's own
/// instrumentation didn't produce) pass through untouched.
pub struct SearchJournalLayer {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl SearchJournalLayer {
    pub fn new<W: Write + Send + 'static>(dest: W) -> SearchJournalLayer {
        SearchJournalLayer {
            writer: Mutex::new(Box::new(dest)),
        }
    }

    fn record<T: Into<JournalEventKind>>(&self, kind: T) {
        let event = JournalEvent {
            timestamp: SystemTime::now(),
            kind: kind.into(),
        };

        let mut writer = self.writer.lock().unwrap();
        if serde_json::to_writer(&mut *writer, &event).is_ok() {
            let _ = writeln!(writer);
        }
    }
}

impl<S> Layer<S> for SearchJournalLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let span = ctx.span(id).expect("span must exist in on_new_span");
        let fields = extract_fields(attrs);
        match span.name() {
            SEARCH => self.record(SearchStartEvent {
                id: id.into_u64(),
                board_size: fields.get("board_size").and_then(|s| s.parse().ok()).unwrap_or(0),
                zkey: fields.get("zkey").and_then(|s| s.parse().ok()).unwrap_or(0),
            }),
            SEARCH_AT_DEPTH => self.record(DepthStartEvent {
                id: id.into_u64(),
                depth: fields.get("depth").and_then(|s| s.parse().ok()).unwrap_or(0),
                zkey: fields.get("zkey").and_then(|s| s.parse().ok()).unwrap_or(0),
            }),
            _ => {}
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let span = ctx.span(&id).expect("span must exist in on_close");
        match span.name() {
            SEARCH => self.record(SearchEndEvent { id: id.into_u64() }),
            SEARCH_AT_DEPTH => self.record(DepthEndEvent { id: id.into_u64() }),
            _ => {}
        }
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target() != SEARCH_TERMINATION_EVENT {
            return;
        }

        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        self.record(TerminationEvent {
            reason: visitor.0.unwrap_or_else(|| "unknown".to_owned()),
        });
    }
}

struct MessageVisitor(Option<String>);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{:?}", value));
        }
    }
}

fn extract_fields(attrs: &Attributes<'_>) -> HashMap<String, String> {
    struct Extractor(HashMap<String, String>);

    impl Visit for Extractor {
        fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
            self.0.insert(field.name().to_owned(), format!("{:?}", value));
        }
    }

    let mut extractor = Extractor(HashMap::new());
    attrs.record(&mut extractor);
    extractor.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.0.lock().unwrap().flush()
        }
    }

    #[test]
    fn search_span_tree_is_captured_as_json_lines() {
        let buffer = SharedBuffer::default();
        let layer = SearchJournalLayer::new(buffer.clone());
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            let _search = tracing::debug_span!(SEARCH, board_size = 15u32, zkey = 42u64).entered();
            {
                let _depth = tracing::debug_span!(SEARCH_AT_DEPTH, depth = 4u32, zkey = 42u64).entered();
            }
            tracing::event!(target: SEARCH_TERMINATION_EVENT, tracing::Level::DEBUG, message = "time budget exceeded");
        });

        let contents = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert!(lines
            .iter()
            .any(|l| l.contains("\"event\":\"SearchStart\"") && l.contains("\"board_size\":15") && l.contains("\"zkey\":42")));
        assert!(lines.iter().any(|l| l.contains("\"event\":\"DepthStart\"") && l.contains("\"depth\":4")));
        assert!(lines.iter().any(|l| l.contains("\"event\":\"DepthEnd\"")));
        assert!(lines.iter().any(|l| l.contains("\"event\":\"SearchEnd\"")));
        assert!(lines
            .iter()
            .any(|l| l.contains("\"event\":\"Termination\"") && l.contains("time budget exceeded")));
    }
}
