// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Precomputed line-shape classifier and move-priority tables.
//!
//! Three tables are built once, eagerly, by [`PatternTables::new`] and never mutated afterwards:
//!
//!   * `line_type` — an auxiliary classifier of a maximal run, by `(len, span, count, block)`.
//!   * `pattern_table` — for every possible 16-bit neighborhood key and role, the strongest shape a
//!     stone of that role would form if played at the center of that neighborhood.
//!   * `pval` — for the four directional codes of a single empty cell and one role, a scalar move
//!     priority used by the move generator.
//!
//! None of this holds a reference to any particular board; the whole thing is safe to share behind
//! an `Arc` across every `Board` an `Engine` ever constructs (see `§9`, "Cyclic/back references").

use crate::core::{PatternCode, Square};

const LEN_DIM: usize = 10;
const SPAN_DIM: usize = 6;
const COUNT_DIM: usize = 6;
const BLOCK_DIM: usize = 3;

/// Number of distinct 16-bit neighborhood keys a line can encode (8 neighbors, 2 bits each).
const KEY_SPACE: usize = 1 << 16;

/// Number of roles a pattern is classified for (`Role::Black`, `Role::White`).
const NUM_ROLES: usize = 2;

/// `pval` is indexed by four independent pattern codes, each in `0..NUM_PATTERN_CODES`.
const PVAL_DIM: usize = crate::core::NUM_PATTERN_CODES;

/// Classifies a maximal run from one scan direction into a [`PatternCode`].
///
/// `len` is the total window examined (including gaps), `span` is the distance from the run's first
/// to last same-role stone, `count` is the number of same-role stones, and `block` is the number of
/// blocked ends (0, 1, or 2).
fn classify_run(len: i32, span: i32, count: i32, block: i32) -> PatternCode {
    if len < 5 || count < 2 {
        return PatternCode::None;
    }
    if count == 5 {
        return PatternCode::Win;
    }

    let open = len > 5 && span < 5 && block == 0;
    match (open, count) {
        (true, 2) => PatternCode::Flex2,
        (true, 3) => PatternCode::Flex3,
        (true, 4) => PatternCode::Flex4,
        (false, 2) => PatternCode::Block2,
        (false, 3) => PatternCode::Block3,
        (false, 4) => PatternCode::Block4,
        _ => PatternCode::None,
    }
}

/// `type_table[len][span][count][block]`, built once from [`classify_run`].
struct TypeTable {
    table: Box<[PatternCode]>,
}

impl TypeTable {
    fn new() -> TypeTable {
        let mut table = vec![PatternCode::None; LEN_DIM * SPAN_DIM * COUNT_DIM * BLOCK_DIM];
        for len in 0..LEN_DIM {
            for span in 0..SPAN_DIM {
                for count in 0..COUNT_DIM {
                    for block in 0..BLOCK_DIM {
                        let code = classify_run(len as i32, span as i32, count as i32, block as i32);
                        table[Self::index(len, span, count, block)] = code;
                    }
                }
            }
        }
        TypeTable { table }
    }

    fn index(len: usize, span: usize, count: usize, block: usize) -> usize {
        ((len * SPAN_DIM + span) * COUNT_DIM + count) * BLOCK_DIM + block
    }

    fn get(&self, len: i32, span: i32, count: i32, block: i32) -> PatternCode {
        self.table[Self::index(len as usize, span as usize, count as usize, block as usize)]
    }
}

/// Scans a length-9 line, centered on `line[4]`, first outward to the right (indices 5..=8) then
/// outward to the left (indices 0..=3), classifying the run via `type_table`. The two sub-scans
/// share `count` (stones of the center's role seen so far) but track the "gap so far" (`span - count`)
/// independently on each side, exactly as the reference implementation does.
fn short_line(line: &[Square; 9], types: &TypeTable) -> PatternCode {
    let who = line[4];
    let mut gap = 0i32;
    let mut block = 0i32;
    let mut len = 1i32;
    let mut span = 1i32;
    let mut count = 1i32;

    for k in 5..9 {
        if line[k] == who {
            if gap + count > 4 {
                break;
            }
            count += 1;
            len += 1;
            span = gap + count;
        } else if line[k] == Square::Empty {
            len += 1;
            gap += 1;
        } else {
            if line[k - 1] == who {
                block += 1;
            }
            break;
        }
    }

    gap = span - count;

    for k in (0..4).rev() {
        if line[k] == who {
            if gap + count > 4 {
                break;
            }
            count += 1;
            len += 1;
            span = gap + count;
        } else if line[k] == Square::Empty {
            len += 1;
            gap += 1;
        } else {
            if line[k + 1] == who {
                block += 1;
            }
            break;
        }
    }

    types.get(len, span, count, block)
}

/// Tests whether filling any single empty slot of `line` with `role` completes five in a row,
/// counting the run in both directions from that slot. Returns `Flex4` if at least two distinct
/// empty slots would each complete five (an unstoppable open four), else `Block4`.
fn check_flex4(line: &mut [Square; 9], role: Square) -> PatternCode {
    let mut completions = 0;
    for i in 0..9 {
        if line[i] != Square::Empty {
            continue;
        }

        let mut count = 0;
        for j in (0..i).rev() {
            if line[j] == role {
                count += 1;
            } else {
                break;
            }
        }
        for j in (i + 1)..9 {
            if line[j] == role {
                count += 1;
            } else {
                break;
            }
        }

        if count >= 4 {
            completions += 1;
        }
    }

    if completions >= 2 {
        PatternCode::Flex4
    } else {
        PatternCode::Block4
    }
}

/// Tests whether filling any single empty slot of `line` with `role` upgrades the shape to `Flex4`
/// (an open four). If so the original shape was an open three (`Flex3`) even though both directional
/// scans reported `Block3`; otherwise it really is a closed three.
fn check_flex3(line: &mut [Square; 9], role: Square) -> PatternCode {
    for i in 0..9 {
        if line[i] != Square::Empty {
            continue;
        }
        line[i] = role;
        let upgraded = check_flex4(line, role);
        line[i] = Square::Empty;
        if upgraded == PatternCode::Flex4 {
            return PatternCode::Flex3;
        }
    }
    PatternCode::Block3
}

/// Decodes a 16-bit neighborhood key into a length-9 line centered on `role`. Bit pairs, from low to
/// high, encode the neighbor states at offsets `-4, -3, -2, -1, +1, +2, +3, +4`.
fn decode_line(role: Square, mut key: u16) -> [Square; 9] {
    let mut line = [Square::Empty; 9];
    for i in 0..9 {
        if i == 4 {
            line[i] = role;
            continue;
        }
        line[i] = square_from_bits((key & 0b11) as u8);
        key >>= 2;
    }
    line
}

fn square_from_bits(bits: u8) -> Square {
    match bits {
        0 => Square::Empty,
        1 => Square::Black,
        2 => Square::White,
        3 => Square::Outside,
        _ => unreachable!("two bits can only hold 0..=3"),
    }
}

/// Classifies the strongest shape `role` obtains if placed at the center of the neighborhood `key`
/// describes. See `SPEC_FULL.md` §4.1 for the five-step combination rule.
fn line_type(role: Square, key: u16, types: &TypeTable) -> PatternCode {
    let mut line = decode_line(role, key);
    let mut mirrored = line;
    mirrored.reverse();

    let from_low = short_line(&line, types);
    let from_high = short_line(&mirrored, types);

    match (from_low, from_high) {
        (PatternCode::Block3, PatternCode::Block3) => check_flex3(&mut line, role),
        (PatternCode::Block4, PatternCode::Block4) => check_flex4(&mut line, role),
        _ => from_low.max(from_high),
    }
}

/// `pval[a][b][c][d]`: the move-priority scalar for a cell whose four directional pattern codes (for
/// one role) are `a, b, c, d`. See `SPEC_FULL.md` §4.1.
fn move_priority(a: PatternCode, b: PatternCode, c: PatternCode, d: PatternCode) -> i32 {
    let mut counts = [0i32; PVAL_DIM];
    counts[a.as_usize()] += 1;
    counts[b.as_usize()] += 1;
    counts[c.as_usize()] += 1;
    counts[d.as_usize()] += 1;

    let win = counts[PatternCode::Win.as_usize()];
    let flex4 = counts[PatternCode::Flex4.as_usize()];
    let block4 = counts[PatternCode::Block4.as_usize()];
    let flex3 = counts[PatternCode::Flex3.as_usize()];

    if win > 0 {
        return 5000;
    }
    if flex4 > 0 || block4 > 1 {
        return 1200;
    }
    if block4 > 0 && flex3 > 0 {
        return 1000;
    }
    if flex3 > 1 {
        return 200;
    }

    const WEIGHT: [i32; 6] = [0, 2, 5, 5, 12, 12];
    let mut score = 0;
    for (code, weight) in WEIGHT.iter().enumerate().take(PatternCode::Block4.as_usize() + 1) {
        score += weight * counts[code];
    }
    score
}

/// The complete set of precomputed tables the board and move generator consult. Immutable after
/// construction; intended to be held behind an `Arc` and shared by every board an engine owns.
pub struct PatternTables {
    pattern_table: Box<[PatternCode]>,
    pval: Box<[i32]>,
}

impl PatternTables {
    /// Builds all three tables. This does the full `O(65536 * 2)` pattern classification and
    /// `O(8^4)` priority enumeration up front; construction is the expensive part, lookups are not.
    pub fn new() -> PatternTables {
        let types = TypeTable::new();

        let mut pattern_table = vec![PatternCode::None; KEY_SPACE * NUM_ROLES];
        for key in 0..KEY_SPACE {
            for (role_index, role_square) in [Square::Black, Square::White].into_iter().enumerate() {
                pattern_table[key * NUM_ROLES + role_index] =
                    line_type(role_square, key as u16, &types);
            }
        }

        let mut pval = vec![0i32; PVAL_DIM.pow(4)];
        for a in 0..PVAL_DIM {
            for b in 0..PVAL_DIM {
                for c in 0..PVAL_DIM {
                    for d in 0..PVAL_DIM {
                        let index = Self::pval_index(a, b, c, d);
                        pval[index] = move_priority(
                            PatternCode::from_u8(a as u8),
                            PatternCode::from_u8(b as u8),
                            PatternCode::from_u8(c as u8),
                            PatternCode::from_u8(d as u8),
                        );
                    }
                }
            }
        }

        PatternTables {
            pattern_table: pattern_table.into_boxed_slice(),
            pval: pval.into_boxed_slice(),
        }
    }

    fn pval_index(a: usize, b: usize, c: usize, d: usize) -> usize {
        ((a * PVAL_DIM + b) * PVAL_DIM + c) * PVAL_DIM + d
    }

    /// The strongest shape `role` would form if placed at the center of the 16-bit neighborhood
    /// `key` describes.
    pub fn pattern_for(&self, key: u16, role_square: Square) -> PatternCode {
        let role_index = match role_square {
            Square::Black => 0,
            Square::White => 1,
            _ => panic!("pattern_for called with a non-stone square"),
        };
        self.pattern_table[key as usize * NUM_ROLES + role_index]
    }

    /// The move-priority scalar for a cell whose four directional codes are `codes`.
    pub fn move_priority(&self, codes: [PatternCode; 4]) -> i32 {
        let index = Self::pval_index(
            codes[0].as_usize(),
            codes[1].as_usize(),
            codes[2].as_usize(),
            codes[3].as_usize(),
        );
        self.pval[index]
    }
}

impl Default for PatternTables {
    fn default() -> Self {
        PatternTables::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Direction;

    fn key_with_neighbors(states: [Square; 8]) -> u16 {
        let mut key = 0u16;
        for (i, state) in states.iter().enumerate().rev() {
            key = (key << 2) | state.as_key_bits();
        }
        key
    }

    #[test]
    fn empty_neighborhood_is_none() {
        let tables = PatternTables::new();
        let key = key_with_neighbors([Square::Empty; 8]);
        assert_eq!(tables.pattern_for(key, Square::Black), PatternCode::None);
    }

    #[test]
    fn four_in_a_row_with_open_ends_is_open_four() {
        let tables = PatternTables::new();
        // neighbors, in offset order -4..-1, +1..+4: _ X X X | _ _ _ _
        // placing a black stone at the center with X X X already at -3,-2,-1 and both far ends open
        // (-4 and +1) is flex4 (open four): the run is only four long, but either open end would
        // complete five, so it can't be blocked at just one of them.
        let key = key_with_neighbors([
            Square::Empty,
            Square::Black,
            Square::Black,
            Square::Black,
            Square::Empty,
            Square::Empty,
            Square::Empty,
            Square::Empty,
        ]);
        assert_eq!(tables.pattern_for(key, Square::Black), PatternCode::Flex4);
    }

    #[test]
    fn open_three_is_flex3() {
        let tables = PatternTables::new();
        // _ _ X X | X _ _ _  centered stone joins two stones on the left side with open run.
        let key = key_with_neighbors([
            Square::Empty,
            Square::Empty,
            Square::Black,
            Square::Black,
            Square::Empty,
            Square::Empty,
            Square::Empty,
            Square::Empty,
        ]);
        assert_eq!(tables.pattern_for(key, Square::Black), PatternCode::Flex3);
    }

    #[test]
    fn blocked_end_downgrades_three_to_blocked() {
        let tables = PatternTables::new();
        // same three stones, but the stone immediately past one end is the board edge (Outside).
        let key = key_with_neighbors([
            Square::Empty,
            Square::Outside,
            Square::Black,
            Square::Black,
            Square::Empty,
            Square::Empty,
            Square::Empty,
            Square::Empty,
        ]);
        assert_eq!(tables.pattern_for(key, Square::Black), PatternCode::Block3);
    }

    #[test]
    fn opponent_stones_never_classified_as_the_other_roles_shape() {
        let tables = PatternTables::new();
        let key = key_with_neighbors([
            Square::Empty,
            Square::Empty,
            Square::Black,
            Square::Black,
            Square::Empty,
            Square::Empty,
            Square::Empty,
            Square::Empty,
        ]);
        // the same neighborhood, classified for White, sees no White stones nearby at all.
        assert_eq!(tables.pattern_for(key, Square::White), PatternCode::None);
    }

    #[test]
    fn move_priority_caps_at_win() {
        let tables = PatternTables::new();
        let p = tables.move_priority([
            PatternCode::Win,
            PatternCode::None,
            PatternCode::None,
            PatternCode::None,
        ]);
        assert_eq!(p, 5000);
    }

    #[test]
    fn two_blocked_fours_count_as_a_double_threat() {
        let tables = PatternTables::new();
        let p = tables.move_priority([
            PatternCode::Block4,
            PatternCode::Block4,
            PatternCode::None,
            PatternCode::None,
        ]);
        assert_eq!(p, 1200);
    }

    #[test]
    fn two_open_threes_are_a_double_threat() {
        let tables = PatternTables::new();
        let p = tables.move_priority([
            PatternCode::Flex3,
            PatternCode::Flex3,
            PatternCode::None,
            PatternCode::None,
        ]);
        assert_eq!(p, 200);
    }

    #[test]
    fn weighted_sum_for_mundane_shapes() {
        let tables = PatternTables::new();
        let p = tables.move_priority([
            PatternCode::Block2,
            PatternCode::None,
            PatternCode::None,
            PatternCode::None,
        ]);
        assert_eq!(p, 2);
    }

    #[test]
    fn directions_cover_all_four_axes() {
        // sanity check that Direction::ALL still has exactly the four axes this module assumes.
        assert_eq!(Direction::ALL.len(), 4);
    }
}
