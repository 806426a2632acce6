// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The incremental board position: the grid of cells, side to move, running Zobrist key, and the
//! per-cell pattern/candidate caches that the move generator and evaluator read.

use std::fmt;
use std::sync::Arc;

use crate::core::{Direction, PatternCode, Point, Role, Square, BORDER, MAX_BOARD_SIZE, NUM_DIRECTIONS};
use crate::error::{GomokuError, Result};
use crate::tables::PatternTables;
use crate::zobrist::ZobristTable;

/// Side of the physical cell grid: the playing area (up to `MAX_BOARD_SIZE`) plus a `BORDER`-wide
/// sentinel margin on *both* sides, so every line-key scan can read up to 4 cells past either edge
/// of the board without a bounds check.
const GRID_DIM: usize = (MAX_BOARD_SIZE as i32 + 2 * BORDER) as usize;

/// One square of the board plus its cached move-evaluation state.
#[derive(Copy, Clone, Debug)]
pub struct Cell {
    piece: Square,
    /// Count of stones (either role) within the 5x5 box centered on this cell. Only meaningful
    /// while `piece == Square::Empty`; a cheap pre-filter for "is this cell worth evaluating".
    cand: i32,
    /// `pattern[role.index()][direction as usize]`: the shape `role` would form by playing here.
    /// Frozen at whatever value it held just before a stone was placed (see `Board::check_win`).
    pattern: [[PatternCode; NUM_DIRECTIONS]; 2],
}

impl Cell {
    fn new(piece: Square) -> Cell {
        Cell {
            piece,
            cand: 0,
            pattern: [[PatternCode::None; NUM_DIRECTIONS]; 2],
        }
    }

    pub fn piece(&self) -> Square {
        self.piece
    }

    pub fn is_empty(&self) -> bool {
        self.piece == Square::Empty
    }

    pub fn cand(&self) -> i32 {
        self.cand
    }

    pub fn pattern(&self, role: Role, direction: Direction) -> PatternCode {
        self.pattern[role.index()][direction as usize]
    }

    /// The four directional codes for `role`, in `Direction::ALL` order — the shape `pval` combines.
    pub fn patterns(&self, role: Role) -> [PatternCode; NUM_DIRECTIONS] {
        self.pattern[role.index()]
    }
}

/// An incremental Gomoku position. Holds the cell grid, side to move, history, and running Zobrist
/// key. Shares its [`PatternTables`] and [`ZobristTable`] (built once per engine) with every other
/// board the same engine owns, rather than rebuilding or globally singleton-ing them — see `§9`.
pub struct Board {
    tables: Arc<PatternTables>,
    zobrist: Arc<ZobristTable>,
    size: u32,
    start: i32,
    end: i32,
    zkey: u64,
    who: Role,
    history: Vec<Point>,
    cells: Vec<Cell>,
}

impl Board {
    /// Builds a board of `size × size`, installed via [`Board::set_size`].
    pub fn new(tables: Arc<PatternTables>, zobrist: Arc<ZobristTable>, size: u32) -> Result<Board> {
        let mut board = Board {
            tables,
            zobrist,
            size: 0,
            start: 0,
            end: 0,
            zkey: 0,
            who: Role::Black,
            history: Vec::new(),
            cells: vec![Cell::new(Square::Outside); GRID_DIM * GRID_DIM],
        };
        board.set_size(size)?;
        Ok(board)
    }

    /// Installs the OUTSIDE border, clears the interior to EMPTY, and resets move state. `step`
    /// becomes 0, `who` becomes `Role::Black`, and `zkey` becomes 0.
    pub fn set_size(&mut self, size: u32) -> Result<()> {
        if size < crate::core::MIN_BOARD_SIZE || size > MAX_BOARD_SIZE {
            return Err(GomokuError::InvalidSize(size));
        }

        self.size = size;
        self.start = BORDER;
        self.end = size as i32 + BORDER;

        for x in 0..GRID_DIM as i32 {
            for y in 0..GRID_DIM as i32 {
                let piece = if x < self.start || x >= self.end || y < self.start || y >= self.end {
                    Square::Outside
                } else {
                    Square::Empty
                };
                let idx = self.flat_index(x, y);
                self.cells[idx] = Cell::new(piece);
            }
        }

        self.zkey = 0;
        self.who = Role::Black;
        self.history.clear();
        Ok(())
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn step(&self) -> u32 {
        self.history.len() as u32
    }

    pub fn who(&self) -> Role {
        self.who
    }

    pub fn opp(&self) -> Role {
        self.who.opponent()
    }

    pub fn zkey(&self) -> u64 {
        self.zkey
    }

    pub fn history(&self) -> &[Point] {
        &self.history
    }

    pub fn tables(&self) -> &PatternTables {
        &self.tables
    }

    /// The playing-area bounds, `[start, end)` on both axes.
    pub fn bounds(&self) -> (i32, i32) {
        (self.start, self.end)
    }

    /// `(size/2 + BORDER, size/2 + BORDER)`, the center square new games open on.
    pub fn center(&self) -> Point {
        let c = self.size as i32 / 2 + BORDER;
        Point::new(c, c)
    }

    pub fn cell(&self, p: Point) -> &Cell {
        &self.cells[self.flat_index(p.x, p.y)]
    }

    /// Whether `p` names a square this board actually allocated state for, i.e. is not part of the
    /// OUTSIDE sentinel border.
    pub fn in_bounds(&self, p: Point) -> bool {
        if p.x < 0 || p.y < 0 || p.x as usize >= GRID_DIM || p.y as usize >= GRID_DIM {
            return false;
        }
        self.cells[self.flat_index(p.x, p.y)].piece != Square::Outside
    }

    /// Places a stone of the side to move at `p`, then incrementally updates the candidate mask and
    /// pattern cache around it.
    pub fn make_move(&mut self, p: Point) -> Result<()> {
        if !self.in_bounds(p) || !self.cell(p).is_empty() {
            return Err(GomokuError::IllegalMove(p));
        }

        let idx = self.flat_index(p.x, p.y);
        self.cells[idx].piece = self.who.as_square();
        self.zkey ^= self.zobrist.key_for(self.who, p.x, p.y);
        self.who = self.who.opponent();
        self.history.push(p);

        self.adjust_candidate_mask(p, 1);
        self.update_patterns_around(p);
        Ok(())
    }

    /// Undoes the most recent [`Board::make_move`].
    pub fn unmake_move(&mut self) -> Result<()> {
        let p = self.history.pop().ok_or(GomokuError::EmptyHistory)?;
        self.who = self.who.opponent();
        self.zkey ^= self.zobrist.key_for(self.who, p.x, p.y);

        let idx = self.flat_index(p.x, p.y);
        self.cells[idx].piece = Square::Empty;

        self.adjust_candidate_mask(p, -1);
        self.update_patterns_around(p);
        Ok(())
    }

    /// Resets the board to its freshly-sized state, as if no moves had ever been made. The engine
    /// facade pairs this with clearing the transposition tables to implement the full `restart`.
    pub fn reset(&mut self) -> Result<()> {
        self.set_size(self.size)
    }

    /// True iff the stone just placed (the most recent `make_move`) completed five in a row.
    ///
    /// The played cell's own `pattern` entries were last computed *before* the stone landed there —
    /// `update_patterns_around` never revisits the center square, only its neighbors — so the cached
    /// value still answers "what shape would the mover have formed by playing here", which is
    /// exactly the question this needs answered.
    pub fn check_win(&self) -> bool {
        let Some(&last) = self.history.last() else {
            return false;
        };
        let mover = self.who.opponent();
        self.cell(last)
            .patterns(mover)
            .iter()
            .any(|&code| code == PatternCode::Win)
    }

    fn flat_index(&self, x: i32, y: i32) -> usize {
        debug_assert!((0..GRID_DIM as i32).contains(&x));
        debug_assert!((0..GRID_DIM as i32).contains(&y));
        x as usize * GRID_DIM + y as usize
    }

    fn adjust_candidate_mask(&mut self, center: Point, delta: i32) {
        for dx in -2..=2 {
            for dy in -2..=2 {
                let q = center.plus(dx, dy);
                if self.in_bounds(q) {
                    let idx = self.flat_index(q.x, q.y);
                    self.cells[idx].cand += delta;
                }
            }
        }
    }

    /// Recomputes `pattern` for every in-bounds cell within 4 steps of `center` along each of the 4
    /// directions, on both sides. Never touches `center` itself.
    fn update_patterns_around(&mut self, center: Point) {
        for direction in Direction::ALL {
            let (dx, dy) = direction.step();
            for &sign in &[1, -1] {
                let mut q = center.plus(sign * dx, sign * dy);
                for _ in 0..4 {
                    if !self.in_bounds(q) {
                        break;
                    }
                    let key = self.line_key(q, direction);
                    let idx = self.flat_index(q.x, q.y);
                    self.cells[idx].pattern[Role::Black.index()][direction as usize] =
                        self.tables.pattern_for(key, Square::Black);
                    self.cells[idx].pattern[Role::White.index()][direction as usize] =
                        self.tables.pattern_for(key, Square::White);
                    q = q.plus(sign * dx, sign * dy);
                }
            }
        }
    }

    /// The 16-bit neighborhood key for the line through `center` along `direction`: the 2-bit state
    /// of each of the 8 neighbors (4 on each side), packed low-to-high in the order
    /// `{-4, -3, -2, -1, +1, +2, +3, +4}`.
    fn line_key(&self, center: Point, direction: Direction) -> u16 {
        let (dx, dy) = direction.step();
        let mut key: u16 = 0;
        for (i, &k) in [-4, -3, -2, -1, 1, 2, 3, 4].iter().enumerate() {
            let q = center.plus(k * dx, k * dy);
            let bits = self.square_at(q).as_key_bits();
            key |= bits << (i * 2);
        }
        key
    }

    fn square_at(&self, p: Point) -> Square {
        self.cells[self.flat_index(p.x, p.y)].piece
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in self.start..self.end {
            for x in self.start..self.end {
                write!(f, "{}", self.cell(Point::new(x, y)).piece())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
