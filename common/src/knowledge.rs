use std::collections::{BTreeSet, HashSet};

use anyhow::Context;
use itertools::Itertools;
use log::{debug, trace, warn};

use crate::{Constraint, KnowledgeError, Point};

/// What a single update to the knowledge base taught it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deductions {
    /// Cells proven safe by this update.
    pub safes: BTreeSet<Point>,
    /// Cells proven to be mines by this update.
    pub mines: BTreeSet<Point>,
    /// Constraints stored as new knowledge.
    pub constraints_added: usize,
    /// Closure passes run before reaching the fixed point.
    pub passes: usize,
}

impl Deductions {
    /// True if nothing was learned.
    pub fn is_empty(&self) -> bool {
        self.safes.is_empty() && self.mines.is_empty() && self.constraints_added == 0
    }
}

/// Everything known about one game: probed cells, proven safe cells, proven
/// mines, and the constraints still relating the unclassified cells.
///
/// Constraints never mention a classified cell; facts are purged from every
/// constraint as soon as they are learned.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KnowledgeBase {
    height: usize,
    width: usize,
    moves_made: BTreeSet<Point>,
    safes: BTreeSet<Point>,
    mines: BTreeSet<Point>,
    constraints: Vec<Constraint>,
    compromised: bool,
}

impl KnowledgeBase {
    pub fn new(height: usize, width: usize) -> Self {
        KnowledgeBase {
            height,
            width,
            moves_made: BTreeSet::new(),
            safes: BTreeSet::new(),
            mines: BTreeSet::new(),
            constraints: Vec::new(),
            compromised: false,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Cells that have been probed.
    pub fn moves_made(&self) -> &BTreeSet<Point> {
        &self.moves_made
    }

    /// Cells proven safe, probed or not.
    pub fn safes(&self) -> &BTreeSet<Point> {
        &self.safes
    }

    /// Cells proven to be mines.
    pub fn mines(&self) -> &BTreeSet<Point> {
        &self.mines
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Whether an earlier inconsistency has frozen this knowledge base.
    pub fn is_compromised(&self) -> bool {
        self.compromised
    }

    /// Proven safe cells that have not been probed yet.
    pub fn safe_unplayed(&self) -> BTreeSet<Point> {
        self.safes.difference(&self.moves_made).copied().collect()
    }

    /// Record that probing `cell` revealed `count` mines among its neighbors,
    /// then deduce as much as possible.
    ///
    /// Observing a cell that was already probed is a no-op.
    pub fn observe(&mut self, cell: Point, count: usize) -> Result<Deductions, KnowledgeError> {
        self.check_bounds(cell)?;
        self.update(|kb, report| {
            if kb.moves_made.contains(&cell) {
                debug!("{cell} was already observed, ignoring");
                return Ok(());
            }

            debug!("observing {cell} with {count} neighboring mines");
            kb.moves_made.insert(cell);
            kb.propagate_safe(cell)?;

            let constraint = kb.neighborhood(cell, count)?;
            kb.absorb(constraint, report)?;
            kb.close(report)
        })
    }

    /// Fold an externally known constraint into the knowledge base and deduce
    /// as much as possible.
    pub fn add_constraint(
        &mut self,
        constraint: Constraint,
    ) -> Result<Deductions, KnowledgeError> {
        for &cell in constraint.cells() {
            self.check_bounds(cell)?;
        }
        self.update(|kb, report| {
            kb.absorb(constraint, report)?;
            kb.close(report)
        })
    }

    /// Record that `cell` is a mine and propagate it to every constraint.
    pub fn mark_mine(&mut self, cell: Point) -> Result<Deductions, KnowledgeError> {
        self.check_bounds(cell)?;
        self.update(|kb, report| {
            kb.propagate_mine(cell)?;
            kb.close(report)
        })
    }

    /// Record that `cell` is safe and propagate it to every constraint.
    pub fn mark_safe(&mut self, cell: Point) -> Result<Deductions, KnowledgeError> {
        self.check_bounds(cell)?;
        self.update(|kb, report| {
            kb.propagate_safe(cell)?;
            kb.close(report)
        })
    }

    /// Encodes the whole knowledge base with `bcs`.
    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        bcs::to_bytes(self).context("failed to encode knowledge base")
    }

    /// Decodes a knowledge base produced by [`KnowledgeBase::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        bcs::from_bytes(bytes).context("failed to decode knowledge base")
    }

    fn check_bounds(&self, point: Point) -> Result<(), KnowledgeError> {
        if point.in_bounds(self.height, self.width) {
            Ok(())
        } else {
            Err(KnowledgeError::OutOfBounds {
                point,
                height: self.height,
                width: self.width,
            })
        }
    }

    /// Runs a mutation and reports what it taught us. Any error latches the
    /// knowledge base into the compromised state.
    fn update(
        &mut self,
        mutation: impl FnOnce(&mut Self, &mut Deductions) -> Result<(), KnowledgeError>,
    ) -> Result<Deductions, KnowledgeError> {
        if self.compromised {
            return Err(KnowledgeError::Compromised);
        }

        let safes_before = self.safes.clone();
        let mines_before = self.mines.clone();
        let mut report = Deductions::default();

        if let Err(err) = mutation(self, &mut report) {
            warn!("knowledge base compromised: {err}");
            self.compromised = true;
            return Err(err);
        }

        report.safes = self.safes.difference(&safes_before).copied().collect();
        report.mines = self.mines.difference(&mines_before).copied().collect();
        trace!(
            "knowledge after update: [{}]",
            self.constraints.iter().join("; ")
        );
        Ok(report)
    }

    /// The constraint "exactly `count` of the neighbors of `cell` are mines",
    /// restricted to neighbors that are not classified yet.
    fn neighborhood(&self, cell: Point, count: usize) -> Result<Constraint, KnowledgeError> {
        let (flagged, unknown): (Vec<Point>, Vec<Point>) = cell
            .neighbors(self.height, self.width)
            .filter(|neighbor| !self.safes.contains(neighbor))
            .partition(|neighbor| self.mines.contains(neighbor));

        let remaining = count
            .checked_sub(flagged.len())
            .ok_or(KnowledgeError::CountUnderflow {
                count,
                removed: flagged.len(),
            })?;
        Constraint::new(unknown, remaining)
    }

    /// Stores a constraint, or resolves it on the spot if it is trivial.
    /// Returns whether anything was learned.
    fn absorb(
        &mut self,
        mut constraint: Constraint,
        report: &mut Deductions,
    ) -> Result<bool, KnowledgeError> {
        let classified: Vec<Point> = constraint
            .cells()
            .iter()
            .filter(|&&cell| self.safes.contains(&cell) || self.mines.contains(&cell))
            .copied()
            .collect();
        for cell in classified {
            if self.mines.contains(&cell) {
                constraint.mark_mine(cell)?;
            } else {
                constraint.mark_safe(cell)?;
            }
        }

        if constraint.is_empty() {
            return Ok(false);
        }

        let mut changed = false;
        if constraint.count() == constraint.len() {
            for &cell in constraint.cells() {
                changed |= self.propagate_mine(cell)?;
            }
        } else if constraint.count() == 0 {
            for &cell in constraint.cells() {
                changed |= self.propagate_safe(cell)?;
            }
        } else if !self.constraints.contains(&constraint) {
            trace!("learned {constraint}");
            self.constraints.push(constraint);
            report.constraints_added += 1;
            changed = true;
        }
        Ok(changed)
    }

    /// Returns whether `cell` was not already known to be a mine.
    fn propagate_mine(&mut self, cell: Point) -> Result<bool, KnowledgeError> {
        if self.mines.contains(&cell) {
            return Ok(false);
        }
        if self.safes.contains(&cell) {
            return Err(KnowledgeError::Contradiction { point: cell });
        }

        trace!("{cell} is a mine");
        self.mines.insert(cell);
        for constraint in &mut self.constraints {
            constraint.mark_mine(cell)?;
        }
        self.prune();
        Ok(true)
    }

    /// Returns whether `cell` was not already known to be safe.
    fn propagate_safe(&mut self, cell: Point) -> Result<bool, KnowledgeError> {
        if self.safes.contains(&cell) {
            return Ok(false);
        }
        if self.mines.contains(&cell) {
            return Err(KnowledgeError::Contradiction { point: cell });
        }

        trace!("{cell} is safe");
        self.safes.insert(cell);
        for constraint in &mut self.constraints {
            constraint.mark_safe(cell)?;
        }
        self.prune();
        Ok(true)
    }

    /// Drops constraints that carry no information any more, and duplicates
    /// produced by propagation.
    fn prune(&mut self) {
        let mut seen = HashSet::new();
        self.constraints
            .retain(|constraint| !constraint.is_empty() && seen.insert(constraint.clone()));
    }

    /// Repeats direct propagation and subset resolution until a pass teaches
    /// nothing new.
    fn close(&mut self, report: &mut Deductions) -> Result<(), KnowledgeError> {
        loop {
            report.passes += 1;
            trace!(
                "closure pass {} over {} constraints",
                report.passes,
                self.constraints.len()
            );
            let mut changed = false;

            let (mines, safes) = self.known_facts()?;
            for cell in mines {
                changed |= self.propagate_mine(cell)?;
            }
            for cell in safes {
                changed |= self.propagate_safe(cell)?;
            }

            for candidate in self.resolve_subsets()? {
                changed |= self.absorb(candidate, report)?;
            }

            if !changed {
                return Ok(());
            }
        }
    }

    /// Union of every constraint's trivially known mines and safe cells.
    fn known_facts(&self) -> Result<(BTreeSet<Point>, BTreeSet<Point>), KnowledgeError> {
        let mut mines = BTreeSet::new();
        let mut safes = BTreeSet::new();
        for constraint in &self.constraints {
            mines.extend(constraint.known_mines());
            safes.extend(constraint.known_safes());
        }

        if let Some(&point) = mines.intersection(&safes).next() {
            return Err(KnowledgeError::Contradiction { point });
        }
        Ok((mines, safes))
    }

    /// For every ordered pair where one constraint's cells are contained in
    /// the other's, the constraint over the cells left over.
    fn resolve_subsets(&self) -> Result<Vec<Constraint>, KnowledgeError> {
        let mut candidates = Vec::new();
        for (i, subset) in self.constraints.iter().enumerate() {
            for (j, superset) in self.constraints.iter().enumerate() {
                if i == j || !subset.is_subset(superset) {
                    continue;
                }

                let candidate = superset.subtract(subset)?;
                if !candidate.is_empty() {
                    candidates.push(candidate);
                }
            }
        }
        Ok(candidates.into_iter().unique().collect())
    }
}
