use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IteratorRandom;

use crate::Point;

/// The true minefield. The knowledge base never sees it; it only hears the
/// neighbor counts the board reports for probed cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub height: usize,
    pub width: usize,
    mines: BTreeSet<Point>,
    /// Mines the player has flagged so far.
    flagged: BTreeSet<Point>,
}

impl Board {
    /// Places `mine_count` mines uniformly at random.
    pub fn new<R: Rng + ?Sized>(
        height: usize,
        width: usize,
        mine_count: usize,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        if height == 0 || width == 0 {
            anyhow::bail!("board must have at least one row and one column");
        }
        if mine_count >= height * width {
            anyhow::bail!(
                "{mine_count} mines do not fit on a {height}x{width} board with a safe cell left"
            );
        }

        let mines = (0..height)
            .flat_map(|row| (0..width).map(move |col| Point::new(row, col)))
            .choose_multiple(rng, mine_count)
            .into_iter()
            .collect();

        Ok(Board {
            height,
            width,
            mines,
            flagged: BTreeSet::new(),
        })
    }

    /// A board with mines exactly at the given cells.
    pub fn with_mines(
        height: usize,
        width: usize,
        mines: impl IntoIterator<Item = Point>,
    ) -> anyhow::Result<Self> {
        let mines: BTreeSet<Point> = mines.into_iter().collect();
        if let Some(outside) = mines.iter().find(|p| !p.in_bounds(height, width)) {
            anyhow::bail!("mine {outside} is outside the {height}x{width} board");
        }

        Ok(Board {
            height,
            width,
            mines,
            flagged: BTreeSet::new(),
        })
    }

    pub fn is_mine(&self, cell: Point) -> bool {
        self.mines.contains(&cell)
    }

    pub fn mine_count(&self) -> usize {
        self.mines.len()
    }

    /// Number of mines within one row and column of `cell`, not counting
    /// the cell itself.
    pub fn nearby_mines(&self, cell: Point) -> usize {
        cell.neighbors(self.height, self.width)
            .filter(|neighbor| self.mines.contains(neighbor))
            .count()
    }

    pub fn flag(&mut self, cell: Point) {
        self.flagged.insert(cell);
    }

    /// Whether every mine, and nothing else, has been flagged.
    pub fn won(&self) -> bool {
        self.flagged == self.mines
    }
}
