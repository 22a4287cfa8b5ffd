use alloc::collections::{BTreeSet, VecDeque};
use ndarray::Array2;

use crate::*;

/// Whether a ball at `from` can travel to `to` one orthogonal step at a time.
///
/// Only passable cells (empty or preview) may be crossed or landed on. The
/// origin itself is never checked, it holds the ball that is about to move.
pub fn is_reachable(board: &Array2<Tile>, from: Coord2, to: Coord2) -> bool {
    if !board.in_bounds(from) || !board.in_bounds(to) {
        return false;
    }

    if from == to {
        return true;
    }

    if !board[to.to_nd_index()].is_passable() {
        return false;
    }

    let mut visited = BTreeSet::from([from]);
    let mut to_visit = VecDeque::from([from]);

    while let Some(visit_coords) = to_visit.pop_front() {
        if visit_coords == to {
            log::trace!("Path {:?} -> {:?} found after {} visits", from, to, visited.len());
            return true;
        }

        for next in board.iter_orthogonal(visit_coords) {
            if board[next.to_nd_index()].is_passable() && visited.insert(next) {
                to_visit.push_back(next);
            }
        }
    }

    log::trace!("No path {:?} -> {:?}, explored {} cells", from, to, visited.len());
    false
}
