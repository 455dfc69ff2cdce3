use std::collections::BTreeSet;
use std::fmt;

use itertools::Itertools;

use crate::{KnowledgeError, Point};

/// A logical statement about the board: exactly `count` of `cells` are mines.
///
/// The count never exceeds the number of cells; every mutation that would
/// break this is reported as an error instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Constraint {
    cells: BTreeSet<Point>,
    count: usize,
}

impl Constraint {
    pub fn new(
        cells: impl IntoIterator<Item = Point>,
        count: usize,
    ) -> Result<Self, KnowledgeError> {
        let cells: BTreeSet<Point> = cells.into_iter().collect();
        if count > cells.len() {
            return Err(KnowledgeError::CountExceedsCells {
                count,
                cells: cells.len(),
            });
        }
        Ok(Constraint { cells, count })
    }

    pub fn cells(&self) -> &BTreeSet<Point> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells that must all be mines, i.e. every cell when the count covers
    /// the whole set. An empty constraint knows nothing.
    pub fn known_mines(&self) -> BTreeSet<Point> {
        if !self.cells.is_empty() && self.count == self.cells.len() {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Cells that must all be safe, i.e. every cell when the count is zero.
    pub fn known_safes(&self) -> BTreeSet<Point> {
        if !self.cells.is_empty() && self.count == 0 {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Remove a cell known to be a mine, taking one mine off the count.
    pub fn mark_mine(&mut self, cell: Point) -> Result<(), KnowledgeError> {
        if !self.cells.contains(&cell) {
            return Ok(());
        }
        if self.count == 0 {
            return Err(KnowledgeError::CountUnderflow {
                count: self.count,
                removed: 1,
            });
        }
        self.cells.remove(&cell);
        self.count -= 1;
        Ok(())
    }

    /// Remove a cell known to be safe. The count is unchanged.
    pub fn mark_safe(&mut self, cell: Point) -> Result<(), KnowledgeError> {
        if !self.cells.contains(&cell) {
            return Ok(());
        }
        if self.count == self.cells.len() {
            return Err(KnowledgeError::CountExceedsCells {
                count: self.count,
                cells: self.cells.len() - 1,
            });
        }
        self.cells.remove(&cell);
        Ok(())
    }

    pub fn is_subset(&self, other: &Constraint) -> bool {
        self.cells.is_subset(&other.cells)
    }

    /// Subset resolution: given `other` whose cells are contained in ours,
    /// the remaining cells hold exactly the remaining mines.
    ///
    /// Callers must check [`Constraint::is_subset`] first.
    pub fn subtract(&self, other: &Constraint) -> Result<Constraint, KnowledgeError> {
        debug_assert!(other.is_subset(self));
        let count = self.count.checked_sub(other.count).ok_or(
            KnowledgeError::CountUnderflow {
                count: self.count,
                removed: other.count,
            },
        )?;
        Constraint::new(self.cells.difference(&other.cells).copied(), count)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}} = {}", self.cells.iter().join(", "), self.count)
    }
}
