// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Engine`], the caller-owned facade a UI or protocol adapter drives: a board, its own
//! transposition tables, and the six operations listed in `SPEC_FULL.md` §6.

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::core::Point;
use crate::error::Result;
use crate::search::{SearchOptions, Searcher};
use crate::table::TranspositionTable;
use crate::tables::PatternTables;
use crate::zobrist::ZobristTable;

/// Per-engine configuration: board size plus the timing knobs the searcher consults.
///
/// Round-trips through `serde_json` so a Gomocup-style adapter can load it from the protocol's
/// `INFO` key/value pairs.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct EngineOptions {
    pub board_size: u32,
    /// Hard per-move cap, in milliseconds.
    pub timeout_turn_ms: u64,
    /// Advisory cap for the whole match, in milliseconds. Not consulted by the searcher directly;
    /// callers that track match time feed its remainder into `time_left_ms` each turn.
    pub timeout_match_ms: u64,
    /// Remaining match time, in milliseconds.
    pub time_left_ms: u64,
}

impl Default for EngineOptions {
    fn default() -> EngineOptions {
        EngineOptions {
            board_size: 15,
            timeout_turn_ms: 5_000,
            timeout_match_ms: 10_000_000,
            time_left_ms: 10_000_000,
        }
    }
}

/// Binds a [`Board`] to its own transposition tables and a shared, immutable pair of precomputed
/// tables. Self-play harnesses construct one `Engine` per side and share the precomputed tables
/// between them via [`Engine::with_shared_tables`].
pub struct Engine {
    board: Board,
    transposition: TranspositionTable,
    rng: Box<dyn RngCore + Send>,
    options: EngineOptions,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Result<Engine> {
        let tables = Arc::new(PatternTables::new());
        let zobrist = Arc::new(ZobristTable::new());
        Engine::with_shared_tables(tables, zobrist, options)
    }

    /// Builds an engine sharing precomputed tables another engine already constructed — the
    /// self-play case from `SPEC_FULL.md` §9.
    pub fn with_shared_tables(
        tables: Arc<PatternTables>,
        zobrist: Arc<ZobristTable>,
        options: EngineOptions,
    ) -> Result<Engine> {
        let board = Board::new(tables, zobrist, options.board_size)?;
        Ok(Engine {
            board,
            transposition: TranspositionTable::new(),
            rng: Box::new(SmallRng::from_entropy()),
            options,
        })
    }

    /// Builds an engine with an injected RNG, for deterministic early-game move tests (`SPEC_FULL.md`
    /// §9 "Random control").
    pub fn with_rng(options: EngineOptions, rng: impl RngCore + Send + 'static) -> Result<Engine> {
        let tables = Arc::new(PatternTables::new());
        let zobrist = Arc::new(ZobristTable::new());
        let board = Board::new(tables, zobrist, options.board_size)?;
        Ok(Engine {
            board,
            transposition: TranspositionTable::new(),
            rng: Box::new(rng),
            options,
        })
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// `set_size(S)`; valid `6 <= S <= 20`.
    pub fn set_size(&mut self, size: u32) -> Result<()> {
        self.board.set_size(size)?;
        self.options.board_size = size;
        Ok(())
    }

    /// Places a stone for the side to move.
    pub fn make_move(&mut self, p: Point) -> Result<()> {
        self.board.make_move(p)
    }

    /// Applies a whitespace-separated list of UI-facing `"x,y"` moves in order, alternating sides
    /// starting with `Role::Black` — the notation `gomoku-search`/`gomoku-eval`/`gomoku-moves`
    /// accept on the command line to set up a position without a full Gomocup `BOARD` block.
    pub fn play_moves(&mut self, moves: &str) -> Result<()> {
        for token in moves.split_whitespace() {
            let p = crate::core::Point::parse_ui(token, self.options.board_size)
                .map_err(|e| crate::error::GomokuError::InvalidMoveList(token.to_owned(), e))?;
            self.make_move(p)?;
        }
        Ok(())
    }

    /// Removes the last stone.
    pub fn unmake_move(&mut self) -> Result<()> {
        self.board.unmake_move()
    }

    /// Returns to an empty board of the same size and zeros both transposition tables.
    pub fn restart(&mut self) -> Result<()> {
        self.transposition.clear();
        self.board.reset()
    }

    pub fn check_win(&self) -> bool {
        self.board.check_win()
    }

    /// Runs the searcher (or one of the two opening shortcuts) with the configured timing options
    /// and returns its choice.
    pub fn get_best_move(&mut self) -> Point {
        match self.board.step() {
            0 => self.board.center(),
            1 | 2 => self.random_opening_reply(),
            _ => {
                let search_options = SearchOptions {
                    timeout_turn_ms: self.options.timeout_turn_ms,
                    time_left_ms: self.options.time_left_ms,
                };
                let mut searcher = Searcher::new(&mut self.board, &mut self.transposition, search_options);
                searcher.search().best_move
            }
        }
    }

    /// Picks an empty cell within a `step`-wide box of the very first move, per `SPEC_FULL.md` §4.6 —
    /// a deliberately shallow reply since there is too little information on the board yet for a
    /// search to say anything a random nearby move doesn't.
    fn random_opening_reply(&mut self) -> Point {
        let step = self.board.step() as i32;
        let anchor = self.board.history()[0];
        loop {
            let dx = self.rng.gen_range(-step..=step);
            let dy = self.rng.gen_range(-step..=step);
            let candidate = anchor.plus(dx, dy);
            if self.board.in_bounds(candidate) && self.board.cell(candidate).is_empty() {
                return candidate;
            }
        }
    }
}
