use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Line through a cell along which streaks are counted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
    /// Top-left to bottom-right.
    MainDiagonal,
    /// Top-right to bottom-left.
    AntiDiagonal,
}

impl Axis {
    /// Evaluation order used when resolving a cell.
    pub const ALL: [Axis; 4] = [
        Axis::Horizontal,
        Axis::Vertical,
        Axis::MainDiagonal,
        Axis::AntiDiagonal,
    ];

    /// Step towards one end of the line, the other end is its negation.
    const fn delta(self) -> (isize, isize) {
        match self {
            Self::Horizontal => (0, 1),
            Self::Vertical => (1, 0),
            Self::MainDiagonal => (1, 1),
            Self::AntiDiagonal => (1, -1),
        }
    }
}

pub type StreakArms = SmallVec<[Coord2; 8]>;

/// Cells on both sides of `center` along `axis` holding exactly the same tile as `center`.
///
/// The center itself is not included, so the run length is `arms.len() + 1`.
pub fn streak_arms(board: &Array2<Tile>, center: Coord2, axis: Axis) -> StreakArms {
    let mut arms = StreakArms::new();
    if !board.in_bounds(center) {
        return arms;
    }

    let tile = board[center.to_nd_index()];
    let bounds = board.board_size();
    let (d_row, d_column) = axis.delta();

    for delta in [(-d_row, -d_column), (d_row, d_column)] {
        let mut coords = center;
        while let Some(next) = apply_delta(coords, delta, bounds) {
            if board[next.to_nd_index()] != tile {
                break;
            }
            arms.push(next);
            coords = next;
        }
    }

    arms
}

/// Points for clearing `total` balls at once: overshooting the minimum multiplies the reward.
pub const fn streak_score(total: CellCount, min_streak: u8) -> u32 {
    let total = total as u32;
    total * (total + 1).saturating_sub(min_streak as u32)
}

/// Result of clearing the streaks through one cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakClear {
    /// Axes that qualified, in evaluation order.
    pub axes: SmallVec<[Axis; 4]>,
    /// Balls removed, center included.
    pub cleared: CellCount,
    pub score: u32,
}

/// Removes every qualifying streak through `center` and scores them as one combined clear.
///
/// Only live balls are considered; an empty, preview or selected center is left alone.
/// Returns `None` when no axis reaches `min_streak`, in which case the board is untouched.
pub fn clear_streaks(board: &mut Array2<Tile>, center: Coord2, min_streak: u8) -> Option<StreakClear> {
    if !board.in_bounds(center) || !board[center.to_nd_index()].is_normal() {
        return None;
    }

    let mut axes = SmallVec::new();
    let mut arm_total: CellCount = 0;

    // Axes only meet at the center, which stays in place until the end, so
    // clearing one axis cannot change what the next one detects.
    for axis in Axis::ALL {
        let arms = streak_arms(board, center, axis);
        if arms.len() + 1 < usize::from(min_streak) {
            continue;
        }

        for &coords in &arms {
            board[coords.to_nd_index()] = Tile::Empty;
        }
        arm_total += arms.len() as CellCount;
        axes.push(axis);
        log::trace!("{:?} streak of {} through {:?}", axis, arms.len() + 1, center);
    }

    if arm_total == 0 {
        return None;
    }

    board[center.to_nd_index()] = Tile::Empty;
    let cleared = arm_total + 1;
    let score = streak_score(cleared, min_streak);
    log::debug!("Cleared {} balls through {:?} on {:?}, score {}", cleared, center, axes, score);

    Some(StreakClear {
        axes,
        cleared,
        score,
    })
}
