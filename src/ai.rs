use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

use super::board::{Board, BoardSize, Point};
use super::error::GameError;
use super::interaction::ActionType;
use super::sentence::Sentence;
use super::Agent;

/// Knowledge accumulated over one game: the cells probed, the cells proven
/// to be mines or safe, and every sentence still carrying information.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    size: BoardSize,
    moves_made: HashSet<Point>,
    mines: HashSet<Point>,
    safes: HashSet<Point>,
    knowledge: Vec<Sentence>,
}

impl InferenceEngine {
    pub fn new(size: BoardSize) -> InferenceEngine {
        InferenceEngine {
            size,
            moves_made: HashSet::new(),
            mines: HashSet::new(),
            safes: HashSet::new(),
            knowledge: Vec::new(),
        }
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub fn moves_made(&self) -> &HashSet<Point> {
        &self.moves_made
    }

    pub fn known_mines(&self) -> &HashSet<Point> {
        &self.mines
    }

    pub fn known_safes(&self) -> &HashSet<Point> {
        &self.safes
    }

    pub fn knowledge(&self) -> &[Sentence] {
        &self.knowledge
    }

    pub fn mark_mine(&mut self, point: Point) -> Result<(), GameError> {
        if self.safes.contains(&point) {
            return Err(GameError::Contradiction(format!("{} is already known to be safe", point)))
        }
        self.mines.insert(point);
        for sentence in self.knowledge.iter_mut() {
            sentence.mark_mine(&point)?;
        }
        Ok(())
    }

    pub fn mark_safe(&mut self, point: Point) -> Result<(), GameError> {
        if self.mines.contains(&point) {
            return Err(GameError::Contradiction(format!("{} is already known to be a mine", point)))
        }
        self.safes.insert(point);
        for sentence in self.knowledge.iter_mut() {
            sentence.mark_safe(&point)?;
        }
        Ok(())
    }

    /// Ingests the number of mines the board reported around a probed cell
    /// and resolves the knowledge base until nothing new can be deduced.
    pub fn add_knowledge(&mut self, point: Point, count: usize) -> Result<(), GameError> {
        self.size.check(&point)?;
        debug!(%point, count, "adding knowledge");

        self.moves_made.insert(point);
        self.mark_safe(point)?;

        let sentence = self.sentence_for(&point, count)?;
        trace!(%sentence, "new sentence");

        let mut derived: Vec<Sentence> = Vec::new();
        for fact in &self.knowledge {
            let synthesis = fact.subtract(&sentence).or_else(|| sentence.subtract(fact));
            if let Some(synthesis) = synthesis {
                let synthesis = synthesis?;
                if !derived.contains(&synthesis) && !self.knowledge.contains(&synthesis) {
                    derived.push(synthesis);
                }
            }
        }
        for synthesis in derived {
            trace!(%synthesis, "derived sentence");
            self.knowledge.push(synthesis);
        }
        if !self.knowledge.contains(&sentence) {
            self.knowledge.push(sentence);
        }

        self.resolve()?;
        self.check_invariants()
    }

    /// The sentence for a probe, with already known neighbours subtracted out.
    fn sentence_for(&self, point: &Point, count: usize) -> Result<Sentence, GameError> {
        let neighbors = self.size.neighbor_points(point);
        let known_mines = neighbors.iter().filter(|cell| self.mines.contains(cell)).count();
        let count = count.checked_sub(known_mines).ok_or_else(|| GameError::Contradiction(
            format!("{} reports {} mines but {} neighbours are known mines", point, count, known_mines)))?;
        let unknown = neighbors.into_iter()
            .filter(|cell| !self.mines.contains(cell) && !self.safes.contains(cell));
        Sentence::new(unknown, count)
    }

    /// Repeats conclusion extraction and subset resolution until a full pass
    /// learns nothing.
    fn resolve(&mut self) -> Result<(), GameError> {
        loop {
            let mut new_mines = HashSet::new();
            let mut new_safes = HashSet::new();
            for sentence in &self.knowledge {
                if let Some(mines) = sentence.known_mines() {
                    new_mines.extend(mines.iter().copied());
                }
                if let Some(safes) = sentence.known_safes() {
                    new_safes.extend(safes.iter().copied());
                }
            }
            let learned = !new_mines.is_empty() || !new_safes.is_empty();
            for mine in new_mines {
                debug!(%mine, "deduced mine");
                self.mark_mine(mine)?;
            }
            for safe in new_safes {
                debug!(%safe, "deduced safe");
                self.mark_safe(safe)?;
            }

            self.prune()?;
            let derived = self.infer_subsets()?;
            if !learned && !derived {
                return Ok(())
            }
        }
    }

    fn prune(&mut self) -> Result<(), GameError> {
        if let Some(sentence) = self.knowledge.iter().find(|s| s.is_empty() && s.count() != 0) {
            return Err(GameError::Contradiction(format!("{} has no cells left", sentence)))
        }
        self.knowledge.retain(|sentence| !sentence.is_empty());
        let mut unique: Vec<Sentence> = Vec::with_capacity(self.knowledge.len());
        for sentence in self.knowledge.drain(..) {
            if !unique.contains(&sentence) {
                unique.push(sentence);
            }
        }
        self.knowledge = unique;
        Ok(())
    }

    /// Subset resolution over every pair of sentences. Returns whether any
    /// sentence was added.
    fn infer_subsets(&mut self) -> Result<bool, GameError> {
        let mut derived: Vec<Sentence> = Vec::new();
        for superset in &self.knowledge {
            for subset in &self.knowledge {
                if let Some(synthesis) = superset.subtract(subset) {
                    let synthesis = synthesis?;
                    if !derived.contains(&synthesis) && !self.knowledge.contains(&synthesis) {
                        derived.push(synthesis);
                    }
                }
            }
        }
        let added = !derived.is_empty();
        for synthesis in derived {
            trace!(%synthesis, "derived sentence");
            self.knowledge.push(synthesis);
        }
        Ok(added)
    }

    pub fn check_invariants(&self) -> Result<(), GameError> {
        if let Some(point) = self.mines.intersection(&self.safes).next() {
            return Err(GameError::Contradiction(format!("{} is both a mine and safe", point)))
        }
        if let Some(point) = self.moves_made.difference(&self.safes).next() {
            return Err(GameError::Contradiction(format!("{} was played but is not known safe", point)))
        }
        for sentence in &self.knowledge {
            if sentence.count() > sentence.cells().len() {
                return Err(GameError::Contradiction(format!("{} claims more mines than cells", sentence)))
            }
            if let Some(point) = sentence.cells().iter()
                .find(|cell| self.mines.contains(cell) || self.safes.contains(cell)) {
                return Err(GameError::Contradiction(format!("{} still mentions known cell {}", sentence, point)))
            }
        }
        Ok(())
    }

    /// The lowest known-safe cell not yet played.
    pub fn make_safe_move(&self) -> Option<Point> {
        self.safes.iter()
            .filter(|point| !self.moves_made.contains(point))
            .min()
            .copied()
    }

    /// A uniformly chosen cell that is neither played nor a known mine.
    pub fn make_random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Point> {
        let candidates: Vec<Point> = self.size.points().into_iter()
            .filter(|point| !self.mines.contains(point) && !self.moves_made.contains(point))
            .collect();
        candidates.choose(rng).copied()
    }

    /// A known mine the board does not show as flagged yet.
    pub fn unflagged_mine(&self, flagged: &HashSet<Point>) -> Option<Point> {
        self.mines.difference(flagged).min().copied()
    }
}

/// Plays by flagging proven mines, then probing proven safe cells, and
/// guessing only when neither is available.
pub struct AiAgent<R: Rng> {
    engine: InferenceEngine,
    rng: R,
    pause: Duration,
}

impl<R: Rng> AiAgent<R> {
    pub fn new(size: BoardSize, rng: R) -> AiAgent<R> {
        AiAgent{engine: InferenceEngine::new(size), rng, pause: Duration::from_millis(0)}
    }

    pub fn with_pause(mut self, pause: Duration) -> AiAgent<R> {
        self.pause = pause;
        self
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }
}

impl<R: Rng> Agent for AiAgent<R> {
    fn generate_move(&mut self, board: &Board) -> Option<ActionType> {
        if !self.pause.is_zero() {
            thread::sleep(self.pause);
        }
        if let Some(mine) = self.engine.unflagged_mine(board.flagged()) {
            return Some(ActionType::Flag(mine))
        }
        if let Some(safe) = self.engine.make_safe_move() {
            return Some(ActionType::Click(safe))
        }
        let guess = self.engine.make_random_move(&mut self.rng)?;
        debug!(%guess, "no certain move, guessing");
        Some(ActionType::Click(guess))
    }

    fn observe(&mut self, point: Point, nearby_mines: usize) -> Result<(), GameError> {
        self.engine.add_knowledge(point, nearby_mines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn points(cells: &[(usize, usize)]) -> HashSet<Point> {
        cells.iter().map(|&(i, j)| Point(i, j)).collect()
    }

    fn engine(height: usize, width: usize) -> InferenceEngine {
        InferenceEngine::new(BoardSize::new(height, width).unwrap())
    }

    #[test]
    fn zero_count_marks_every_neighbor_safe() {
        let mut ai = engine(3, 3);
        ai.add_knowledge(Point(1, 1), 0).unwrap();
        let expected: HashSet<Point> = BoardSize::new(3, 3).unwrap().points().into_iter().collect();
        assert_eq!(ai.known_safes(), &expected);
        assert!(ai.known_mines().is_empty());
        assert!(ai.knowledge().is_empty());
    }

    #[test]
    fn full_count_on_corner_marks_mines() {
        let mut ai = engine(4, 4);
        ai.add_knowledge(Point(0, 0), 3).unwrap();
        assert_eq!(ai.known_mines(), &points(&[(0, 1), (1, 0), (1, 1)]));
        assert_eq!(ai.known_safes(), &points(&[(0, 0)]));
    }

    #[test]
    fn known_safes_are_left_out_of_new_sentence() {
        let mut ai = engine(2, 3);
        ai.mark_safe(Point(1, 1)).unwrap();
        ai.mark_safe(Point(1, 2)).unwrap();
        // (0,2) touches (0,1), (1,1) and (1,2); only (0,1) is still unknown
        ai.add_knowledge(Point(0, 2), 1).unwrap();
        assert_eq!(ai.known_mines(), &points(&[(0, 1)]));
    }

    #[test]
    fn derives_remainder_from_strict_subset() {
        let mut ai = engine(2, 3);
        ai.add_knowledge(Point(0, 0), 1).unwrap();
        assert_eq!(ai.knowledge(), &[Sentence::new(points(&[(0, 1), (1, 0), (1, 1)]), 1).unwrap()]);
        // ({(0,2), (1,0), (1,1), (1,2)}, 1) minus ({(1,0), (1,1)}, 1) leaves (0,2) and (1,2) safe
        ai.add_knowledge(Point(0, 1), 1).unwrap();
        assert!(ai.known_safes().is_superset(&points(&[(0, 2), (1, 2)])));
        assert_eq!(ai.knowledge(), &[Sentence::new(points(&[(1, 0), (1, 1)]), 1).unwrap()]);
    }

    #[test]
    fn strict_subset_marks_remainder_safe() {
        let mut ai = engine(3, 3);
        ai.knowledge.push(Sentence::new(points(&[(2, 0), (2, 1), (2, 2)]), 1).unwrap());
        ai.knowledge.push(Sentence::new(points(&[(2, 0), (2, 1)]), 1).unwrap());
        ai.resolve().unwrap();
        assert!(ai.known_safes().contains(&Point(2, 2)));
        assert_eq!(ai.knowledge(), &[Sentence::new(points(&[(2, 0), (2, 1)]), 1).unwrap()]);
    }

    #[test]
    fn new_sentence_accounts_for_known_mines() {
        let mut ai = engine(3, 3);
        ai.mark_mine(Point(0, 1)).unwrap();
        ai.add_knowledge(Point(0, 0), 1).unwrap();
        // the single reported mine is (0,1), so the rest are safe
        assert_eq!(ai.known_safes(), &points(&[(0, 0), (1, 0), (1, 1)]));
        assert_eq!(ai.known_mines(), &points(&[(0, 1)]));
    }

    #[test]
    fn marks_are_idempotent() {
        let mut once = engine(3, 3);
        once.add_knowledge(Point(0, 0), 1).unwrap();
        let mut twice = once.clone();
        once.mark_mine(Point(2, 2)).unwrap();
        twice.mark_mine(Point(2, 2)).unwrap();
        twice.mark_mine(Point(2, 2)).unwrap();
        once.mark_safe(Point(1, 0)).unwrap();
        twice.mark_safe(Point(1, 0)).unwrap();
        twice.mark_safe(Point(1, 0)).unwrap();
        assert_eq!(once.known_mines(), twice.known_mines());
        assert_eq!(once.known_safes(), twice.known_safes());
        assert_eq!(once.knowledge(), twice.knowledge());
    }

    #[test]
    fn conflicting_marks_are_rejected() {
        let mut ai = engine(3, 3);
        ai.mark_safe(Point(1, 1)).unwrap();
        assert!(ai.mark_mine(Point(1, 1)).is_err());
        ai.mark_mine(Point(0, 0)).unwrap();
        assert!(ai.mark_safe(Point(0, 0)).is_err());
    }

    #[test]
    fn out_of_bounds_probe_is_rejected_before_mutation() {
        let mut ai = engine(3, 3);
        let err = ai.add_knowledge(Point(3, 0), 0).unwrap_err();
        assert_eq!(err, GameError::OutOfBounds{point: Point(3, 0), height: 3, width: 3});
        assert!(ai.moves_made().is_empty());
        assert!(ai.known_safes().is_empty());
    }

    #[test]
    fn impossible_count_is_a_contradiction() {
        let mut ai = engine(3, 3);
        assert!(matches!(ai.add_knowledge(Point(0, 0), 4), Err(GameError::Contradiction(_))));
    }

    #[test]
    fn solves_single_mine_board() {
        let size = BoardSize::new(3, 3).unwrap();
        let board = Board::with_mines(size, vec![Point(2, 2)]).unwrap();
        let mut ai = InferenceEngine::new(size);

        ai.add_knowledge(Point(0, 0), board.nearby_mine_count(&Point(0, 0)).unwrap()).unwrap();
        assert!(ai.known_safes().is_superset(&points(&[(0, 1), (1, 0), (1, 1)])));

        let mut turns = 0;
        while let Some(point) = ai.make_safe_move() {
            assert!(!board.is_mine(&point).unwrap());
            ai.add_knowledge(point, board.nearby_mine_count(&point).unwrap()).unwrap();
            turns += 1;
            assert!(turns < 9);
        }
        assert_eq!(ai.known_mines(), &points(&[(2, 2)]));
        assert_eq!(ai.known_safes().len(), 8);
    }

    #[test]
    fn safe_move_is_lowest_unplayed() {
        let mut ai = engine(3, 3);
        ai.add_knowledge(Point(1, 1), 0).unwrap();
        assert_eq!(ai.make_safe_move(), Some(Point(0, 0)));
        ai.add_knowledge(Point(0, 0), 0).unwrap();
        assert_eq!(ai.make_safe_move(), Some(Point(0, 1)));
    }

    #[test]
    fn no_moves_on_exhausted_board() {
        let mut ai = engine(1, 2);
        ai.add_knowledge(Point(0, 0), 1).unwrap();
        assert_eq!(ai.make_safe_move(), None);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(ai.make_random_move(&mut rng), None);
    }

    #[test]
    fn agent_flags_known_mines_before_clicking() {
        let size = BoardSize::new(2, 2).unwrap();
        let board = Board::with_mines(size, vec![Point(0, 1), Point(1, 0), Point(1, 1)]).unwrap();
        let mut agent = AiAgent::new(size, ChaCha8Rng::seed_from_u64(1));
        agent.observe(Point(0, 0), 3).unwrap();
        assert_eq!(agent.generate_move(&board), Some(ActionType::Flag(Point(0, 1))));
    }

    proptest! {
        #[test]
        fn random_moves_avoid_mines_and_played_cells(seed in any::<u64>(), draws in 1..50usize) {
            let mut ai = engine(4, 4);
            ai.add_knowledge(Point(0, 0), 3).unwrap();
            ai.add_knowledge(Point(3, 3), 0).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for _ in 0..draws {
                let point = ai.make_random_move(&mut rng).unwrap();
                prop_assert!(!ai.known_mines().contains(&point));
                prop_assert!(!ai.moves_made().contains(&point));
                prop_assert!(ai.size().contains(&point));
            }
        }

        #[test]
        fn deductions_are_sound(height in 1..9usize, width in 1..9usize,
                                density in 0..40usize, seed in any::<u64>()) {
            let size = BoardSize::new(height, width).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mine_count = size.area() * density / 100;
            let board = Board::new_random(size, mine_count, &mut rng).unwrap();
            let mut ai = InferenceEngine::new(size);

            loop {
                let point = match ai.make_safe_move() {
                    Some(point) => point,
                    None => match ai.make_random_move(&mut rng) {
                        Some(point) => point,
                        None => break,
                    }
                };
                if board.is_mine(&point).unwrap() {
                    break
                }
                ai.add_knowledge(point, board.nearby_mine_count(&point).unwrap()).unwrap();

                prop_assert!(ai.check_invariants().is_ok());
                for mine in ai.known_mines() {
                    prop_assert!(board.is_mine(mine).unwrap());
                }
                for safe in ai.known_safes() {
                    prop_assert!(!board.is_mine(safe).unwrap());
                }
                for sentence in ai.knowledge() {
                    prop_assert!(sentence.count() <= sentence.cells().len());
                    let actual = sentence.cells().iter().filter(|cell| board.is_mine(cell).unwrap()).count();
                    prop_assert_eq!(actual, sentence.count());
                }
            }
        }
    }
}
