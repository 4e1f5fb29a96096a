pub mod board;
pub mod sentence;
pub mod ai;
pub mod interaction;
pub mod config;
pub mod error;

use tracing::{debug, info};

use board::{Board, Point, Probe};
use error::GameError;
use interaction::ActionType;

/// Anything that can pick moves for a game: the inference engine or a person.
pub trait Agent {
    fn generate_move(&mut self, board: &Board) -> Option<ActionType>;

    /// Told the number of mines around a cell it just probed safely.
    fn observe(&mut self, point: Point, nearby_mines: usize) -> Result<(), GameError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Won,
    Lost(Point),
    /// The agent had no move left to make.
    Stalled,
}

pub fn game_loop<A: Agent>(board: &mut Board, agent: &mut A) -> Result<GameOutcome, GameError> {
    while !board.is_won() {
        debug!("\n{}", board);
        match agent.generate_move(board) {
            None => {
                info!("no moves left");
                return Ok(GameOutcome::Stalled)
            }
            Some(ActionType::Click(point)) => match board.probe(&point)? {
                Probe::Mine => {
                    info!(%point, "hit a mine");
                    return Ok(GameOutcome::Lost(point))
                }
                Probe::Safe(nearby_mines) => agent.observe(point, nearby_mines)?,
            },
            Some(ActionType::Flag(point)) => board.toggle_flag(&point)?,
        }
    }
    info!("all mines flagged");
    Ok(GameOutcome::Won)
}
