use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::board::BoardSize;
use super::error::GameError;

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "minesweeper")]
#[command(about = "Minesweeper played by a knowledge-based inference engine", long_about = None)]
pub struct GameConfig {
    /// Number of rows
    #[arg(long, default_value_t = 8)]
    pub height: usize,

    /// Number of columns
    #[arg(long, default_value_t = 8)]
    pub width: usize,

    /// Number of mines placed on the board
    #[arg(long, default_value_t = 8)]
    pub mines: usize,

    /// Seed for mine placement and guesses; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Play from stdin instead of letting the AI play
    #[arg(long)]
    pub human: bool,

    /// Milliseconds the AI waits before each move
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Default for GameConfig {
    fn default() -> GameConfig {
        GameConfig{height: 8, width: 8, mines: 8, seed: None, human: false, delay_ms: 0, verbose: false}
    }
}

impl GameConfig {
    pub fn board_size(&self) -> Result<BoardSize, GameError> {
        let size = BoardSize::new(self.height, self.width)?;
        if self.mines > size.area() {
            return Err(GameError::TooManyMines{mines: self.mines, cells: size.area()})
        }
        Ok(size)
    }

    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    pub fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }
}
