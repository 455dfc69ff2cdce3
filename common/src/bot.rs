use log::{debug, info};
use rand::Rng;
use rand::seq::IteratorRandom;

use crate::{Board, KnowledgeBase, Point};

/// A cell to probe, and why it was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Proven safe by the knowledge base.
    Safe(Point),
    /// Picked at random among cells not known to be mines.
    Guess(Point),
}

impl Move {
    pub fn point(self) -> Point {
        match self {
            Move::Safe(point) | Move::Guess(point) => point,
        }
    }
}

/// Picks the next cell to probe without touching the knowledge base.
///
/// Prefers a proven safe cell. Otherwise guesses among cells that are neither
/// probed nor known mines. `None` once no such cell is left.
pub fn choose_move<R: Rng + ?Sized>(knowledge: &KnowledgeBase, rng: &mut R) -> Option<Move> {
    if let Some(point) = knowledge.safe_unplayed().into_iter().choose(rng) {
        return Some(Move::Safe(point));
    }

    (0..knowledge.height())
        .flat_map(|row| (0..knowledge.width()).map(move |col| Point::new(row, col)))
        .filter(|point| {
            !knowledge.mines().contains(point) && !knowledge.moves_made().contains(point)
        })
        .choose(rng)
        .map(Move::Guess)
}

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// Plays a board using only what the knowledge base can prove, guessing when
/// it proves nothing.
pub struct Bot {
    pub board: Board,
    pub knowledge: KnowledgeBase,
    pub state: GameState,
}

impl Bot {
    pub fn new(board: Board) -> Self {
        let knowledge = KnowledgeBase::new(board.height, board.width);
        Bot {
            board,
            knowledge,
            state: GameState::Playing,
        }
    }

    /// Makes one move. Returns the move made, or `None` if the game is over
    /// or there is nothing left to probe.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> anyhow::Result<Option<Move>> {
        if self.state != GameState::Playing {
            return Ok(None);
        }
        let Some(next) = choose_move(&self.knowledge, rng) else {
            return Ok(None);
        };

        let point = next.point();
        debug!("bot plays {next:?}");
        if self.board.is_mine(point) {
            info!("bot hit a mine at {point}");
            self.state = GameState::Lost;
            return Ok(Some(next));
        }

        let deductions = self
            .knowledge
            .observe(point, self.board.nearby_mines(point))?;
        debug!(
            "{point} taught {} safe cells, {} mines, {} constraints in {} passes",
            deductions.safes.len(),
            deductions.mines.len(),
            deductions.constraints_added,
            deductions.passes
        );
        for &mine in &deductions.mines {
            self.board.flag(mine);
        }

        if self.board.won() || self.cleared() {
            info!("bot cleared the board");
            self.state = GameState::Won;
        }
        Ok(Some(next))
    }

    /// Plays until the game is decided.
    pub fn play<R: Rng + ?Sized>(&mut self, rng: &mut R) -> anyhow::Result<GameState> {
        while self.state == GameState::Playing {
            if self.step(rng)?.is_none() {
                anyhow::bail!("no moves left while the game is still being played");
            }
        }
        Ok(self.state)
    }

    /// Every non-mine cell has been probed.
    fn cleared(&self) -> bool {
        let cells = self.board.height * self.board.width;
        self.knowledge.moves_made().len() == cells - self.board.mine_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_choose_move_prefers_safe_cells() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut knowledge = KnowledgeBase::new(3, 3);
        knowledge.observe(Point::new(0, 0), 0).unwrap();

        for _ in 0..10 {
            let next = choose_move(&knowledge, &mut rng).unwrap();
            assert!(matches!(next, Move::Safe(_)));
            assert!(knowledge.safe_unplayed().contains(&next.point()));
        }
    }

    #[test]
    fn test_choose_move_guesses_around_known_mines() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut knowledge = KnowledgeBase::new(2, 2);
        knowledge.mark_mine(Point::new(0, 0)).unwrap();

        for _ in 0..10 {
            let next = choose_move(&knowledge, &mut rng).unwrap();
            assert!(matches!(next, Move::Guess(_)));
            assert_ne!(next.point(), Point::new(0, 0));
        }
    }

    #[test]
    fn test_choose_move_none_when_exhausted() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut knowledge = KnowledgeBase::new(1, 2);
        knowledge.observe(Point::new(0, 0), 1).unwrap();

        assert_eq!(knowledge.mines().len(), 1);
        assert_eq!(choose_move(&knowledge, &mut rng), None);
    }

    #[test]
    fn test_bot_wins_single_mine_board() {
        let mut rng = StdRng::seed_from_u64(11);
        let board = Board::with_mines(3, 3, [Point::new(2, 2)]).unwrap();
        let mut bot = Bot::new(board);

        // Open on a cell far from the mine so the game never needs a guess
        bot.knowledge.observe(Point::new(0, 0), 0).unwrap();
        let state = bot.play(&mut rng).unwrap();

        assert_eq!(state, GameState::Won);
        assert_eq!(bot.knowledge.mines().len(), 1);
    }

    #[test]
    fn test_bot_games_end() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let board = Board::new(6, 6, 6, &mut rng).unwrap();
            let mut bot = Bot::new(board);
            let state = bot.play(&mut rng).unwrap();

            assert_ne!(state, GameState::Playing);
            assert!(!bot.knowledge.is_compromised());
            assert!(bot.step(&mut rng).unwrap().is_none());
        }
    }
}
