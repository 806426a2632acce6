// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Static position evaluation: turns a board's pattern cache into a [`Score`] from the side to
//! move's perspective.

mod value;

pub use value::{Score, LOSS_SCORE, WIN_SCORE};

use crate::board::Board;
use crate::core::{PatternCode, NUM_PATTERN_CODES};

/// Per-pattern weight, indexed by [`PatternCode::as_usize`]. `None` (index 0) is unweighted.
const WEIGHT: [i32; NUM_PATTERN_CODES] = [0, 2, 12, 18, 96, 144, 800, 1200];

/// Scores `board` from its side to move's perspective.
///
/// Walks every empty candidate cell once, tallying how many of each [`PatternCode`] each role would
/// form there across its four directions. Two coincident `Block4`s on the same cell, for the same
/// role, are worth exactly as much as one `Flex4` (an unstoppable double four), so they're folded
/// together before scoring. See `SPEC_FULL.md` §4.4 for the terminal-score short circuits and the
/// 1.2x attacker weighting, reproduced here as exact integer arithmetic (`6 * who - 5 * opp`).
pub fn evaluate(board: &Board) -> Score {
    let who = board.who();
    let opp = board.opp();

    let mut who_count = [0i32; NUM_PATTERN_CODES];
    let mut opp_count = [0i32; NUM_PATTERN_CODES];

    let (start, end) = board.bounds();
    for x in start..end {
        for y in start..end {
            let p = crate::core::Point::new(x, y);
            let cell = board.cell(p);
            if cell.cand() <= 0 || !cell.is_empty() {
                continue;
            }

            let block4_before = who_count[PatternCode::Block4.as_usize()];
            for code in cell.patterns(who) {
                who_count[code.as_usize()] += 1;
            }
            for code in cell.patterns(opp) {
                opp_count[code.as_usize()] += 1;
            }

            if who_count[PatternCode::Block4.as_usize()] - block4_before >= 2 {
                who_count[PatternCode::Block4.as_usize()] -= 2;
                who_count[PatternCode::Flex4.as_usize()] += 1;
            }
        }
    }

    if who_count[PatternCode::Win.as_usize()] >= 1 {
        return Score::win();
    }
    if opp_count[PatternCode::Win.as_usize()] >= 2 {
        return Score::loss();
    }
    if opp_count[PatternCode::Win.as_usize()] == 0 && who_count[PatternCode::Flex4.as_usize()] >= 1 {
        return Score::win();
    }

    let mut who_score = 0i32;
    let mut opp_score = 0i32;
    for code in 1..NUM_PATTERN_CODES {
        who_score += who_count[code] * WEIGHT[code];
        opp_score += opp_count[code] * WEIGHT[code];
    }

    // 1.2 * who_score - opp_score, done in exact integers as 6*who_score - 5*opp_score. This scales
    // every non-terminal score by 5x relative to the floating-point original; alpha-beta only ever
    // compares scores against each other or against the two terminal sentinels above, so the scale
    // factor is invisible to search as long as it stays clear of +-10000 in practice.
    Score::new(6 * who_score - 5 * opp_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::core::{Point, Role};
    use crate::tables::PatternTables;
    use crate::zobrist::ZobristTable;
    use std::sync::Arc;

    fn new_board(size: u32) -> Board {
        Board::new(Arc::new(PatternTables::new()), Arc::new(ZobristTable::new()), size).unwrap()
    }

    #[test]
    fn empty_board_evaluates_to_zero() {
        let board = new_board(15);
        assert_eq!(evaluate(&board), Score::new(0));
    }

    #[test]
    fn a_completed_five_in_a_row_is_a_win_for_its_owner() {
        let mut board = new_board(15);
        let center = board.center();
        for i in 0..4 {
            board.make_move(center.plus(i, 0)).unwrap();
            board.make_move(center.plus(i, 6)).unwrap();
        }
        board.make_move(center.plus(4, 0)).unwrap();
        // Black just completed five in a row; White (to move) sees this as a loss.
        assert_eq!(board.who(), Role::White);
        assert_eq!(evaluate(&board), Score::loss());
    }

    #[test]
    fn an_open_three_scores_better_than_a_blocked_three() {
        // Black plays an open three in the middle of an empty board.
        let mut open = new_board(15);
        let c = open.center();
        open.make_move(c).unwrap();
        open.make_move(Point::new(0, 0)).unwrap();
        open.make_move(c.plus(1, 0)).unwrap();
        open.make_move(Point::new(0, 1)).unwrap();
        open.make_move(c.plus(2, 0)).unwrap();
        open.make_move(Point::new(0, 2)).unwrap();
        // It's White to move; White's own shapes are empty so the score reflects Black's open three
        // as a negative (bad-for-White) value.
        let open_score = evaluate(&open).get();

        // Black plays the same three stones but hard against the board edge (Outside blocks one end).
        let mut blocked = new_board(15);
        let (start, _) = blocked.bounds();
        let edge = Point::new(start, start + 5);
        blocked.make_move(edge).unwrap();
        blocked.make_move(Point::new(0, 0)).unwrap();
        blocked.make_move(edge.plus(1, 0)).unwrap();
        blocked.make_move(Point::new(0, 1)).unwrap();
        blocked.make_move(edge.plus(2, 0)).unwrap();
        blocked.make_move(Point::new(0, 2)).unwrap();
        let blocked_score = evaluate(&blocked).get();

        assert!(open_score < blocked_score);
    }
}
