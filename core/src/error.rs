use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Ball color outside of the configured palette")]
    InvalidColor,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("More than one ball is selected")]
    MultipleSelections,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;
