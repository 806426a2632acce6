// Copyright 2021-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gomoku::movegen;
use gomoku::tables::PatternTables;
use gomoku::zobrist::ZobristTable;
use gomoku::Board;

fn empty_board(size: u32) -> Board {
    Board::new(Arc::new(PatternTables::new()), Arc::new(ZobristTable::new()), size).unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("opening-movegen", |b| {
        let mut board = empty_board(15);
        let center = board.center();
        board.make_move(center).unwrap();
        b.iter(|| movegen::generate_moves(black_box(&board)));
    });

    c.bench_function("midgame-movegen", |b| {
        let mut board = empty_board(15);
        let center = board.center();
        for i in 0..6 {
            board.make_move(center.plus(i, 0)).unwrap();
            board.make_move(center.plus(i, 3)).unwrap();
        }
        b.iter(|| movegen::generate_moves(black_box(&board)));
    });

    c.bench_function("forced-reply-movegen", |b| {
        let mut board = empty_board(15);
        let center = board.center();
        for i in 0..4 {
            board.make_move(center.plus(i, 0)).unwrap();
            board.make_move(center.plus(i, 6)).unwrap();
        }
        b.iter(|| movegen::generate_moves(black_box(&board)));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
