// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error taxonomy for the engine boundary (`§7` of the design: illegal moves, out-of-range sizes).

use thiserror::Error;

use crate::core::Point;

/// Errors that the engine boundary can return. Every variant corresponds to a caller mistake — the
/// core never recovers from these internally, it just refuses to mutate state and hands the error
/// back up.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GomokuError {
    #[error("board size {0} is out of range [{}, {}]", crate::core::MIN_BOARD_SIZE, crate::core::MAX_BOARD_SIZE)]
    InvalidSize(u32),

    #[error("illegal move at {0}: square is not empty or is out of bounds")]
    IllegalMove(Point),

    #[error("unmake_move called with no moves on the history stack")]
    EmptyHistory,

    #[error("invalid move list token {0:?}: {1}")]
    InvalidMoveList(String, crate::core::PointParseError),
}

pub type Result<T> = std::result::Result<T, GomokuError>;
