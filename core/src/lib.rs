#![no_std]

extern crate alloc;

use core::ops::BitOr;
use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use rules::*;
pub use snapshot::*;
pub use tile::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod rules;
mod snapshot;
mod tile;
mod types;

/// Balls spawned as previews at the end of every uneventful turn.
pub const DEFAULT_PREVIEW_COUNT: CellCount = 3;

/// Shortest streak ever accepted, whatever the board size.
pub const MIN_STREAK_FLOOR: u8 = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Board size as `(height, width)`.
    pub size: Coord2,
    pub colors: u8,
    pub min_streak: u8,
    pub preview_count: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, colors: u8, min_streak: u8) -> Self {
        Self {
            size,
            colors,
            min_streak,
            preview_count: DEFAULT_PREVIEW_COUNT,
        }
    }

    pub fn new((height, width): Coord2, colors: u8) -> Self {
        let height = height.clamp(1, Coord::MAX);
        let width = width.clamp(1, Coord::MAX);
        let colors = colors.clamp(1, MAX_COLORS);

        let derived = height.min(width).saturating_sub(4);
        if derived < MIN_STREAK_FLOOR {
            log::warn!(
                "Board {}x{} yields a streak length of {}, using {} instead",
                height,
                width,
                derived,
                MIN_STREAK_FLOOR
            );
        }
        let min_streak = derived.max(MIN_STREAK_FLOOR);

        Self::new_unchecked((height, width), colors, min_streak)
    }

    /// Nine by nine board with the full palette.
    pub fn classic() -> Self {
        Self::new((9, 9), MAX_COLORS)
    }

    pub const fn with_preview_count(mut self, preview_count: CellCount) -> Self {
        self.preview_count = preview_count;
        self
    }

    pub const fn height(&self) -> Coord {
        self.size.0
    }

    pub const fn width(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::classic()
    }
}

/// What a single pick did to the game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PickOutcome {
    /// Picked something that cannot be selected.
    NoChange,
    Selected,
    Deselected,
    /// Switched the selection to another ball.
    Reselected,
    /// Target is passable but walled off from the selected ball.
    Unreachable,
    /// Ball moved; `cleared` and `score_gained` cover the whole turn including spawned balls.
    Moved {
        cleared: CellCount,
        score_gained: u32,
    },
    /// Ball moved and no room was left for the next previews.
    GameOver { score_gained: u32 },
}

impl PickOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        use PickOutcome::*;
        match self {
            NoChange => false,
            Selected => true,
            Deselected => true,
            Reselected => true,
            Unreachable => false,
            Moved { .. } => true,
            GameOver { .. } => true,
        }
    }

    pub const fn is_move(self) -> bool {
        matches!(self, Self::Moved { .. } | Self::GameOver { .. })
    }
}

/// Totals of a batch of streak resolutions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClearTally {
    pub cleared: CellCount,
    pub score: u32,
}

impl ClearTally {
    pub const fn is_empty(self) -> bool {
        self.cleared == 0
    }
}

impl From<StreakClear> for ClearTally {
    fn from(clear: StreakClear) -> Self {
        Self {
            cleared: clear.cleared,
            score: clear.score,
        }
    }
}

/// Used to merge tallies when several cells resolve in one pass
impl BitOr for ClearTally {
    type Output = ClearTally;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self {
            cleared: self.cleared.saturating_add(rhs.cleared),
            score: self.score.saturating_add(rhs.score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streak_length_follows_smaller_side() {
        assert_eq!(GameConfig::new((9, 9), 8).min_streak, 5);
        assert_eq!(GameConfig::new((12, 10), 8).min_streak, 6);
        assert_eq!(GameConfig::new((9, 20), 8).min_streak, 5);
    }

    #[test]
    fn small_boards_use_streak_floor() {
        assert_eq!(GameConfig::new((6, 6), 4).min_streak, MIN_STREAK_FLOOR);
        assert_eq!(GameConfig::new((3, 9), 4).min_streak, MIN_STREAK_FLOOR);
        assert_eq!(GameConfig::new((1, 1), 4).min_streak, MIN_STREAK_FLOOR);
    }

    #[test]
    fn new_clamps_inputs() {
        let config = GameConfig::new((0, 0), 0);
        assert_eq!(config.size, (1, 1));
        assert_eq!(config.colors, 1);

        let config = GameConfig::new((9, 9), 200);
        assert_eq!(config.colors, MAX_COLORS);
        assert_eq!(config.preview_count, DEFAULT_PREVIEW_COUNT);
        assert_eq!(config.total_cells(), 81);
    }

    #[test]
    fn classic_board() {
        let config = GameConfig::classic();
        assert_eq!((config.height(), config.width()), (9, 9));
        assert_eq!(config.colors, 8);
        assert_eq!(config.with_preview_count(5).preview_count, 5);
    }

    #[test]
    fn tallies_merge() {
        let a = ClearTally { cleared: 5, score: 5 };
        let b = ClearTally { cleared: 6, score: 12 };
        assert_eq!(a | b, ClearTally { cleared: 11, score: 17 });
        assert!(ClearTally::default().is_empty());
    }
}
