// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Candidate move collection, priority scoring, and threat-driven pruning.

use crate::board::Board;
use crate::core::{PatternCode, Point};

/// Hard cap on the number of moves a single [`generate_moves`] call returns.
pub const MAX_MOVES: usize = 40;

/// A candidate move paired with its [`evaluate_move`] priority. Ordering by priority descending is
/// what the insertion sort in [`generate_moves`] establishes.
#[derive(Copy, Clone, Debug)]
struct ScoredMove {
    point: Point,
    priority: i32,
}

/// Combines offensive and defensive move priority for the empty cell at `p`. `p` must be empty.
///
/// If either side could reach a shape worth 200 or more here (a double open three or stronger), the
/// move is scored purely on whichever side's threat is bigger — contesting it outranks every other
/// consideration. Otherwise, the mover's own priority counts twice: developing your own shape is
/// preferred over purely defensive moves of equal opponent value.
fn evaluate_move(board: &Board, p: Point) -> i32 {
    let cell = board.cell(p);
    let s_self = board.tables().move_priority(cell.patterns(board.who()));
    let s_opp = board.tables().move_priority(cell.patterns(board.opp()));

    let max = s_self.max(s_opp);
    if max >= 200 {
        2 * max
    } else {
        2 * s_self + s_opp
    }
}

/// Emits every legal, non-zero-priority move, strongest first, bounded to [`MAX_MOVES`].
///
/// Candidate collection only considers cells with `cand > 0` (within a stone's 5x5 neighborhood) —
/// the overwhelming majority of empty cells on a sparsely-populated board never need evaluating.
pub fn generate_moves(board: &Board) -> Vec<Point> {
    let (start, end) = board.bounds();
    let mut candidates = Vec::new();

    for x in start..end {
        for y in start..end {
            let p = Point::new(x, y);
            let cell = board.cell(p);
            if cell.cand() <= 0 || !cell.is_empty() {
                continue;
            }
            let priority = evaluate_move(board, p);
            if priority > 0 {
                candidates.push(ScoredMove { point: p, priority });
            }
        }
    }

    insertion_sort_descending(&mut candidates);

    let pruned = cut_move_list(board, &candidates);
    if !pruned.is_empty() {
        return pruned;
    }

    candidates
        .into_iter()
        .take(MAX_MOVES)
        .map(|c| c.point)
        .collect()
}

/// Insertion sort by descending priority; the candidate list is small enough that this beats the
/// overhead of a general-purpose sort.
fn insertion_sort_descending(moves: &mut [ScoredMove]) {
    for i in 1..moves.len() {
        let mut j = i;
        while j > 0 && moves[j - 1].priority < moves[j].priority {
            moves.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Threat-driven pruning: if the position has a move that wins outright or must be addressed right
/// now, narrow the candidate list down to just those moves instead of searching everything. Returns
/// an empty vector when no such narrowing applies, signaling the caller to fall back to the full
/// (capped) candidate list.
fn cut_move_list(board: &Board, candidates: &[ScoredMove]) -> Vec<Point> {
    let Some(top) = candidates.first() else {
        return Vec::new();
    };

    if top.priority >= 2400 {
        return vec![top.point];
    }

    let mut moves = Vec::new();
    if top.priority != 1200 {
        return moves;
    }

    let mut i = 0;
    while i < candidates.len() && candidates[i].priority == 1200 {
        moves.push(candidates[i].point);
        i += 1;
    }

    while i < candidates.len() && moves.len() < MAX_MOVES {
        let cell = board.cell(candidates[i].point);
        let has_block4 = |role| cell.patterns(role).contains(&PatternCode::Block4);
        if has_block4(board.who()) || has_block4(board.opp()) {
            moves.push(candidates[i].point);
        }
        i += 1;
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Role;
    use crate::tables::PatternTables;
    use crate::zobrist::ZobristTable;
    use std::sync::Arc;

    fn new_board(size: u32) -> Board {
        Board::new(Arc::new(PatternTables::new()), Arc::new(ZobristTable::new()), size).unwrap()
    }

    #[test]
    fn opening_move_generates_every_neighbor_of_the_center() {
        let mut board = new_board(15);
        let center = board.center();
        board.make_move(center).unwrap();
        let moves = generate_moves(&board);
        assert!(!moves.is_empty());
        assert!(moves.len() <= MAX_MOVES);
        assert!(moves.iter().all(|&p| board.cell(p).is_empty()));
    }

    #[test]
    fn an_immediate_win_is_the_only_move_returned() {
        let mut board = new_board(15);
        let center = board.center();
        // Black builds an open four (both ends empty); White plays harmlessly elsewhere between
        // moves. Either open end now completes five, so the generator should collapse to one move.
        for i in 0..4 {
            board.make_move(center.plus(i, 0)).unwrap();
            board.make_move(center.plus(i, 6)).unwrap();
        }
        assert_eq!(board.who(), Role::Black);
        let moves = generate_moves(&board);
        assert_eq!(moves.len(), 1);
        board.make_move(moves[0]).unwrap();
        assert!(board.check_win());
    }

    #[test]
    fn an_open_three_that_would_become_an_open_four_forces_a_single_block() {
        let mut board = new_board(15);
        let center = board.center();
        // White builds an open three while Black plays passively elsewhere. Either open end would
        // give White an open four next move, so the generator should collapse to one defensive reply.
        board.make_move(Point::new(0, 0)).unwrap();
        board.make_move(center).unwrap();
        board.make_move(Point::new(0, 1)).unwrap();
        board.make_move(center.plus(1, 0)).unwrap();
        board.make_move(Point::new(0, 2)).unwrap();
        board.make_move(center.plus(2, 0)).unwrap();

        assert_eq!(board.who(), Role::Black);
        let moves = generate_moves(&board);
        assert_eq!(moves.len(), 1);
        assert!(moves[0] == center.plus(-1, 0) || moves[0] == center.plus(3, 0));
    }
}
