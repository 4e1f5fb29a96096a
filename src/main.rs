use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use minesweeper::ai::AiAgent;
use minesweeper::board::Board;
use minesweeper::config::GameConfig;
use minesweeper::interaction::HumanAgent;
use minesweeper::{game_loop, GameOutcome};

fn main() -> Result<()> {
    let config = GameConfig::parse();

    let filter = if config.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let size = config.board_size()?;
    let seed = config.seed();
    let mut rng = GameConfig::rng(seed);
    let mut board = Board::new_random(size, config.mines, &mut rng)?;
    info!(seed, height = size.height, width = size.width, mines = board.mine_count(), "starting game");

    let outcome = if config.human {
        let stdin = io::stdin();
        let mut agent = HumanAgent::new(stdin.lock());
        game_loop(&mut board, &mut agent)?
    } else {
        let mut agent = AiAgent::new(size, rng).with_pause(Duration::from_millis(config.delay_ms));
        game_loop(&mut board, &mut agent)?
    };

    println!("{}", board);
    match outcome {
        GameOutcome::Won => println!("you win!"),
        GameOutcome::Lost(point) => {
            println!("{}", board.mine_layout());
            println!("you lose: {} was a mine", point);
        }
        GameOutcome::Stalled => println!("no moves left"),
    }
    Ok(())
}
