use std::collections::HashSet;
use std::fmt;
use itertools::Itertools;

use super::board::Point;
use super::error::GameError;

/// A logical statement about the board: exactly `count` of `cells` are mines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    cells: HashSet<Point>,
    count: usize,
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}} = {}", self.cells.iter().sorted().join(", "), self.count)
    }
}

impl Sentence {
    pub fn new<I: IntoIterator<Item = Point>>(cells: I, count: usize) -> Result<Sentence, GameError> {
        let sentence = Sentence{cells: cells.into_iter().collect(), count};
        if sentence.count > sentence.cells.len() {
            return Err(GameError::Contradiction(format!("{} claims more mines than cells", sentence)))
        }
        Ok(sentence)
    }

    pub fn cells(&self) -> &HashSet<Point> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// An empty sentence carries no information.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn known_mines(&self) -> Option<&HashSet<Point>> {
        if self.count != 0 && self.count == self.cells.len() {
            return Some(&self.cells)
        }
        None
    }

    pub fn known_safes(&self) -> Option<&HashSet<Point>> {
        if self.count == 0 && !self.cells.is_empty() {
            return Some(&self.cells)
        }
        None
    }

    pub fn mark_mine(&mut self, point: &Point) -> Result<(), GameError> {
        if !self.cells.contains(point) {
            return Ok(())
        }
        if self.count == 0 {
            return Err(GameError::Contradiction(format!("{} is a mine but {} has none left", point, self)))
        }
        self.cells.remove(point);
        self.count -= 1;
        Ok(())
    }

    pub fn mark_safe(&mut self, point: &Point) -> Result<(), GameError> {
        if !self.cells.contains(point) {
            return Ok(())
        }
        if self.count == self.cells.len() {
            return Err(GameError::Contradiction(format!("{} is safe but {} needs every cell", point, self)))
        }
        self.cells.remove(point);
        Ok(())
    }

    /// Resolves `self` against a sentence over a strict subset of its cells:
    /// the cells left over hold the mines `subset` does not account for.
    pub fn subtract(&self, subset: &Sentence) -> Option<Result<Sentence, GameError>> {
        if subset.cells.len() >= self.cells.len() || !subset.cells.is_subset(&self.cells) {
            return None
        }
        let remainder = self.cells.difference(&subset.cells).copied();
        let derived = match self.count.checked_sub(subset.count) {
            Some(count) => Sentence::new(remainder, count),
            None => Err(GameError::Contradiction(format!("{} cannot contain {}", self, subset))),
        };
        Some(derived)
    }
}
