// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Engine-vs-engine self-play demo: plays a full game against itself, printing the board after
//! every move, and reports how it ended.

use std::sync::Arc;

use structopt::StructOpt;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use gomoku::engine::{Engine, EngineOptions};
use gomoku::tables::PatternTables;
use gomoku::zobrist::ZobristTable;

#[derive(Debug, StructOpt)]
struct Options {
    /// Board size, 6 <= size <= 20.
    #[structopt(short, long, default_value = "15")]
    size: u32,
    /// Per-move time budget, in milliseconds.
    #[structopt(long, default_value = "2000")]
    timeout_turn_ms: u64,
    /// Maximum number of plies to play before giving up on a decisive result.
    #[structopt(long, default_value = "400")]
    max_plies: u32,
}

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::WARN).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let opts = Options::from_args();
    let options = EngineOptions {
        board_size: opts.size,
        timeout_turn_ms: opts.timeout_turn_ms,
        ..EngineOptions::default()
    };

    // Black and White share one set of precomputed tables, per `SPEC_FULL.md` §9 "Global singleton".
    let tables = Arc::new(PatternTables::new());
    let zobrist = Arc::new(ZobristTable::new());
    let mut engine = Engine::with_shared_tables(tables, zobrist, options).expect("valid board size");

    for ply in 0..opts.max_plies {
        let who = engine.board().who();
        let best = engine.get_best_move();
        let (x, y) = best.to_ui();
        engine.make_move(best).expect("searcher produced a legal move");
        println!("ply {:>4}: {} plays ({x}, {y})", ply + 1, who);
        println!("{}", engine.board());

        if engine.check_win() {
            println!("{} wins after {} plies", who, ply + 1);
            return;
        }
    }

    println!("no decisive result after {} plies", opts.max_plies);
}
