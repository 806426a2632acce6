// Copyright 2021-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Summarizes a newline-delimited-JSON journal produced by `gomoku-search --journal`: how many
//! searches ran, the deepest iteration each one reached, and why each one stopped.
//!
//! Scaled down from a full interactive inspector to a one-shot summary — there is no live search
//! to attach to outside of a running match, so there is nothing for a REPL to poll.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
struct Options {
    /// Path to a newline-delimited-JSON journal written by `gomoku-search --journal`.
    journal: PathBuf,
}

#[derive(Default)]
struct SearchSummary {
    board_size: Option<u32>,
    max_depth: u32,
    depths_opened: u32,
    depths_closed: u32,
    termination: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let opts = Options::from_args();
    let contents = fs::read_to_string(&opts.journal)?;

    // Keyed by the span id `journal::SearchStartEvent::id` assigned, so interleaved searches in one
    // log (a full match capture) are reported separately.
    let mut searches: BTreeMap<u64, SearchSummary> = BTreeMap::new();
    let mut last_open_search: Option<u64> = None;
    let mut terminations_without_a_search = 0u32;

    for (lineno, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .map_err(|e| anyhow::anyhow!("line {}: {e}", lineno + 1))?;
        let event = value.get("event").and_then(Value::as_str).unwrap_or("");

        match event {
            "SearchStart" => {
                let id = value.get("id").and_then(Value::as_u64).unwrap_or(0);
                let board_size = value.get("board_size").and_then(Value::as_u64).map(|v| v as u32);
                searches.insert(id, SearchSummary { board_size, ..SearchSummary::default() });
                last_open_search = Some(id);
            }
            "DepthStart" => {
                let id = value.get("id").and_then(Value::as_u64).unwrap_or(0);
                let depth = value.get("depth").and_then(Value::as_u64).unwrap_or(0) as u32;
                if let Some(summary) = searches.get_mut(&id) {
                    summary.depths_opened += 1;
                    summary.max_depth = summary.max_depth.max(depth);
                }
            }
            "DepthEnd" => {
                let id = value.get("id").and_then(Value::as_u64).unwrap_or(0);
                if let Some(summary) = searches.get_mut(&id) {
                    summary.depths_closed += 1;
                }
            }
            "Termination" => {
                let reason = value.get("reason").and_then(Value::as_str).unwrap_or("unknown");
                match last_open_search.and_then(|id| searches.get_mut(&id)) {
                    Some(summary) => summary.termination = Some(reason.to_owned()),
                    None => terminations_without_a_search += 1,
                }
            }
            "SearchEnd" => {
                let id = value.get("id").and_then(Value::as_u64).unwrap_or(0);
                if last_open_search == Some(id) {
                    last_open_search = None;
                }
            }
            _ => {}
        }
    }

    println!("{} search(es) found in {}", searches.len(), opts.journal.display());
    for (id, summary) in &searches {
        let board_size = summary.board_size.map(|s| s.to_string()).unwrap_or_else(|| "?".to_owned());
        let reason = summary.termination.as_deref().unwrap_or("(no termination event; log may be truncated)");
        println!(
            "  search {id} (board size {board_size}): reached depth {}, {} iteration(s) opened / {} closed, stopped: {reason}",
            summary.max_depth, summary.depths_opened, summary.depths_closed,
        );
    }
    if terminations_without_a_search > 0 {
        println!(
            "  ({} termination event(s) arrived with no matching open search)",
            terminations_without_a_search
        );
    }

    Ok(())
}
