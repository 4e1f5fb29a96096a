use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use itertools::Itertools;

use super::error::GameError;

/// A (row, column) coordinate on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point(pub usize, pub usize);

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSize {
    pub height: usize,
    pub width: usize,
}

impl BoardSize {
    pub fn new(height: usize, width: usize) -> Result<BoardSize, GameError> {
        if height == 0 || width == 0 {
            return Err(GameError::EmptyBoard)
        }
        Ok(BoardSize{height, width})
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Every point on the board in row-major order.
    pub fn points(&self) -> Vec<Point> {
        (0..self.area()).filter_map(|x| self.point_from_integer(x)).collect()
    }

    pub fn point_from_integer(&self, x: usize) -> Option<Point> {
        if x >= self.area() {
            return None
        }
        Some(Point(x/self.width, x%self.width))
    }

    pub fn contains(&self, point: &Point) -> bool {
        point.0 < self.height && point.1 < self.width
    }

    pub fn check(&self, point: &Point) -> Result<(), GameError> {
        if self.contains(point) {
            Ok(())
        } else {
            Err(GameError::OutOfBounds{point: *point, height: self.height, width: self.width})
        }
    }

    /// The up-to-eight cells touching `point`, clipped to the board edges.
    pub fn neighbor_points(&self, point: &Point) -> Vec<Point> {
        (-1i64..=1).cartesian_product(-1i64..=1)
            .filter(|&(i, j)| i != 0 || j != 0)
            .map(|(i, j)| (point.0 as i64 + i, point.1 as i64 + j))
            .filter(|&(x, y)| x >= 0 && x < self.height as i64 && y >= 0 && y < self.width as i64)
            .map(|(x, y)| Point(x as usize, y as usize))
            .collect()
    }
}

fn sample_points<R: Rng + ?Sized>(size: &BoardSize, n: usize, rng: &mut R) -> Result<Vec<Point>, GameError> {
    if n > size.area() {
        return Err(GameError::TooManyMines{mines: n, cells: size.area()})
    }
    let mut possible = size.points();
    possible.shuffle(rng);
    possible.truncate(n);
    Ok(possible)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Mine,
    Safe(usize),
}

/// What the player can see of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellView {
    Hidden,
    Flagged,
    Revealed(usize),
}

impl CellView {
    fn to_str(self) -> String {
        match self {
            CellView::Flagged => String::from("▶"),
            CellView::Hidden => String::from("□"),
            CellView::Revealed(0) => String::from("_"),
            CellView::Revealed(n) => n.to_string(),
        }
    }
}

/// The game oracle: owns the true mine layout and answers probes.
pub struct Board {
    pub size: BoardSize,
    mines: HashSet<Point>,
    flagged: HashSet<Point>,
    revealed: HashMap<Point, usize>,
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(|point| self.view(point).to_str()))
    }
}

impl Board {
    pub fn new_random<R: Rng + ?Sized>(size: BoardSize, mine_count: usize, rng: &mut R) -> Result<Board, GameError> {
        let mines = sample_points(&size, mine_count, rng)?;
        Board::with_mines(size, mines)
    }

    pub fn with_mines<I: IntoIterator<Item = Point>>(size: BoardSize, mines: I) -> Result<Board, GameError> {
        let mines: HashSet<Point> = mines.into_iter().collect();
        for mine in &mines {
            size.check(mine)?;
        }
        Ok(Board{size, mines, flagged: HashSet::new(), revealed: HashMap::new()})
    }

    pub fn mine_count(&self) -> usize {
        self.mines.len()
    }

    pub fn is_mine(&self, point: &Point) -> Result<bool, GameError> {
        self.size.check(point)?;
        Ok(self.mines.contains(point))
    }

    /// Mines among the neighbours of `point`, not counting `point` itself.
    pub fn nearby_mine_count(&self, point: &Point) -> Result<usize, GameError> {
        self.size.check(point)?;
        Ok(self.size.neighbor_points(point).iter()
            .filter(|neighbor| self.mines.contains(neighbor))
            .count())
    }

    pub fn probe(&mut self, point: &Point) -> Result<Probe, GameError> {
        if self.is_mine(point)? {
            return Ok(Probe::Mine)
        }
        let count = self.nearby_mine_count(point)?;
        self.flagged.remove(point);
        self.revealed.insert(*point, count);
        Ok(Probe::Safe(count))
    }

    pub fn toggle_flag(&mut self, point: &Point) -> Result<(), GameError> {
        self.size.check(point)?;
        if self.revealed.contains_key(point) {
            return Ok(())
        }
        if !self.flagged.remove(point) {
            self.flagged.insert(*point);
        }
        Ok(())
    }

    pub fn flagged(&self) -> &HashSet<Point> {
        &self.flagged
    }

    pub fn is_revealed(&self, point: &Point) -> bool {
        self.revealed.contains_key(point)
    }

    /// Won once the flagged cells are exactly the mines.
    pub fn is_won(&self) -> bool {
        self.flagged == self.mines
    }

    pub fn mine_layout(&self) -> String {
        self.render(|point| {
            if self.mines.contains(point) {String::from("X")} else {String::from(" ")}
        })
    }

    fn view(&self, point: &Point) -> CellView {
        match self.revealed.get(point) {
            Some(count) => CellView::Revealed(*count),
            None if self.flagged.contains(point) => CellView::Flagged,
            None => CellView::Hidden,
        }
    }

    fn render<F: Fn(&Point) -> String>(&self, cell_str: F) -> String {
        let mut result = "  ".to_owned();
        for j in 0..self.size.width {
            result += &(j % 10).to_string();
        }
        result += "\n";
        for i in 0..self.size.height {
            result += &(i % 10).to_string();
            result += " ";
            for j in 0..self.size.width {
                result += &cell_str(&Point(i, j));
            }
            result += "\n";
        }
        result
    }
}

#[cfg(test)]
use proptest::prelude::*;
