use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Builds a board from rows written in the [`Tile`] text notation.
pub fn parse_board(rows: &[&str]) -> Result<Array2<Tile>> {
    let height = rows.len();
    let width = rows.first().map_or(0, |row| row.chars().count());

    let mut tiles = Vec::with_capacity(height * width);
    for row in rows {
        let before = tiles.len();
        for ch in row.chars() {
            tiles.push(Tile::from_char(ch).ok_or(GameError::InvalidColor)?);
        }
        if tiles.len() - before != width {
            return Err(GameError::InvalidBoardShape);
        }
    }

    Array2::from_shape_vec((height, width), tiles).map_err(|_| GameError::InvalidBoardShape)
}

/// Renders a board one row per line in the [`Tile`] text notation.
#[derive(Copy, Clone, Debug)]
pub struct BoardView<'a>(pub &'a Array2<Tile>);

impl fmt::Display for BoardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.0.rows() {
            for tile in row {
                write!(f, "{tile}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Everything a front end needs to draw one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub size: Coord2,
    pub colors: u8,
    pub state: TurnState,
    pub selection: Option<Coord2>,
    pub score: u32,
    pub elapsed_secs: u32,
    pub tiles: Array2<Tile>,
}

impl Snapshot {
    pub fn from_engine<S: BallSource>(engine: &BoardEngine<S>) -> Self {
        Self {
            size: engine.size(),
            colors: engine.colors(),
            state: engine.state(),
            selection: engine.selection(),
            score: engine.score(),
            elapsed_secs: engine.elapsed_secs(),
            tiles: engine.board().clone(),
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Score: {}  Time: {}s  {:?}", self.score, self.elapsed_secs, self.state)?;
        write!(f, "{}", BoardView(&self.tiles))
    }
}

/// State dump written when the process hits an unrecoverable failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub reason: String,
    pub state: TurnState,
    pub elapsed_secs: u32,
    pub score: u32,
    pub tiles: Array2<Tile>,
}

impl DiagnosticReport {
    pub fn new<S: BallSource>(engine: &BoardEngine<S>, reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            state: engine.state(),
            elapsed_secs: engine.elapsed_secs(),
            score: engine.score(),
            tiles: engine.board().clone(),
        }
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "An error occurred!")?;
        writeln!(f)?;
        writeln!(f, "Reason: {}", self.reason)?;
        writeln!(f, "Game state: {:?}", self.state)?;
        writeln!(f, "Game time: {}", self.elapsed_secs)?;
        writeln!(f, "Game score: {}", self.score)?;
        writeln!(f, "Game map:")?;
        for row in self.tiles.rows() {
            for tile in row {
                write!(f, "{:>2} ", tile.code())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
