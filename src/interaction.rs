use regex::Regex;
use std::io::BufRead;

use super::board::Board;
use super::board::Point;
use super::error::GameError;
use super::Agent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    Click(Point),
    Flag(Point),
}

/// Reads moves of the form `click ROW COL` or `flag ROW COL`.
pub struct HumanAgent<B: BufRead> {
    input: B,
    pattern: Regex,
}

impl<B: BufRead> HumanAgent<B> {
    pub fn new(input: B) -> HumanAgent<B> {
        let pattern = Regex::new(r"^\s*(click|flag)\s+(\d+)\s+(\d+)\s*$").expect("move pattern is valid");
        HumanAgent{input, pattern}
    }

    fn action_from_string(&self, input: &str) -> Option<ActionType> {
        let cap = self.pattern.captures(input)?;
        let row: usize = cap[2].parse().ok()?;
        let col: usize = cap[3].parse().ok()?;
        let point = Point(row, col);
        match &cap[1] {
            "click" => Some(ActionType::Click(point)),
            "flag" => Some(ActionType::Flag(point)),
            _ => None,
        }
    }
}

impl<B: BufRead> Agent for HumanAgent<B> {
    fn generate_move(&mut self, board: &Board) -> Option<ActionType> {
        println!("{}", board);
        loop {
            println!("Please input your move: click|flag ROW COL");
            let mut input = String::new();
            match self.input.read_line(&mut input) {
                Ok(0) | Err(_) => return None,
                Ok(_) => {}
            }
            match self.action_from_string(&input) {
                Some(ActionType::Click(point)) | Some(ActionType::Flag(point)) if !board.size.contains(&point) => {
                    println!("{} is not on the board", point);
                }
                Some(action) => return Some(action),
                None => println!("Must be of the form: click|flag ROW COL"),
            }
        }
    }

    fn observe(&mut self, _point: Point, _nearby_mines: usize) -> Result<(), GameError> {
        Ok(())
    }
}
