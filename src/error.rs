use thiserror::Error;

use super::board::Point;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("cell {point} is outside the {height}x{width} board")]
    OutOfBounds {
        point: Point,
        height: usize,
        width: usize,
    },

    #[error("cannot place {mines} mines on a board of {cells} cells")]
    TooManyMines { mines: usize, cells: usize },

    #[error("board must have at least one row and one column")]
    EmptyBoard,

    /// The knowledge base no longer describes any possible board.
    #[error("inconsistent knowledge: {0}")]
    Contradiction(String),
}
