// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Static evaluation of a position built from a UI-facing move list, with no search at all —
//! useful for sanity-checking [`gomoku::eval::evaluate`] weights in isolation.

use structopt::StructOpt;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use gomoku::engine::{Engine, EngineOptions};
use gomoku::eval;

#[derive(Debug, StructOpt)]
struct Options {
    /// Board size, 6 <= size <= 20.
    #[structopt(short, long, default_value = "15")]
    size: u32,
    /// Whitespace-separated "x,y" moves, alternating sides starting with Black.
    #[structopt(short, long, default_value = "")]
    moves: String,
    /// If present, prints the board alongside the score.
    #[structopt(long)]
    show_board: bool,
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::WARN).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let opts = Options::from_args();
    let options = EngineOptions { board_size: opts.size, ..EngineOptions::default() };
    let mut engine = Engine::new(options)?;
    engine.play_moves(&opts.moves)?;

    if opts.show_board {
        println!("{}", engine.board());
    }

    let score = eval::evaluate(engine.board());
    println!("{} to move: {}", engine.board().who(), score.get());

    Ok(())
}
