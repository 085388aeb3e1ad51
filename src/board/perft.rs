/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{generate_moves, Board, Side};

/// Perform a perft at the specified depth, counting the boards reachable when sides strictly alternate.
///
/// A side with no legal moves contributes no nodes.
/// This performs bulk counting, meaning that, at depth 1, it returns the number of available moves,
/// rather than making them, recursing again, and returning 1 for each terminal case.
#[inline(always)]
pub fn perft(board: &Board, side: Side, depth: usize) -> u64 {
    perft_generic::<true, false>(board, side, depth)
}

/// Perform a splitperft at the specified depth, printing the number of nodes reachable after each move available at the root node.
#[inline(always)]
pub fn splitperft(board: &Board, side: Side, depth: usize) -> u64 {
    perft_generic::<true, true>(board, side, depth)
}

/// Generic version of `perft` that allows you to specify whether to perform bulk counting and splitperft.
///
/// If `BULK` is set to `true`, this will perform bulk counting.
/// If `SPLIT` is set to `true`, this will perform a splitperft.
pub fn perft_generic<const BULK: bool, const SPLIT: bool>(
    board: &Board,
    side: Side,
    depth: usize,
) -> u64 {
    // Bulk counting; no need to recurse again just to apply a singular move and return 1.
    if BULK && !SPLIT && depth == 1 {
        return generate_moves(board, side).len() as u64;
    }
    // Recursion limit; return 1, since we're fathoming this node.
    else if depth == 0 {
        return 1;
    }

    generate_moves(board, side).into_iter().fold(0, |nodes, mv| {
        let new_nodes =
            perft_generic::<BULK, false>(&board.with_move_made(mv), side.opponent(), depth - 1);

        if SPLIT {
            println!("{mv}\t{new_nodes}");
        }

        nodes + new_nodes
    })
}
