// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Lists the candidate moves [`gomoku::movegen::generate_moves`] would hand the searcher for a
//! position built from a UI-facing move list, strongest first.

use structopt::StructOpt;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use gomoku::engine::{Engine, EngineOptions};
use gomoku::movegen;

#[derive(Debug, StructOpt)]
struct Options {
    /// Board size, 6 <= size <= 20.
    #[structopt(short, long, default_value = "15")]
    size: u32,
    /// Whitespace-separated "x,y" moves, alternating sides starting with Black.
    #[structopt(short, long, default_value = "")]
    moves: String,
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::WARN).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let opts = Options::from_args();
    let options = EngineOptions { board_size: opts.size, ..EngineOptions::default() };
    let mut engine = Engine::new(options)?;
    engine.play_moves(&opts.moves)?;

    let moves = movegen::generate_moves(engine.board());
    println!("{} candidate move(s) for {}:", moves.len(), engine.board().who());
    for p in moves {
        let (x, y) = p.to_ui();
        println!("  {x},{y}");
    }

    Ok(())
}
