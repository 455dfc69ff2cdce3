//! Cross-checks the knowledge base against a SAT solver: every cell it
//! proves safe or mined must be forced by the observations it was given.

use std::collections::HashMap;

use itertools::Itertools;
use minesweeper_kb::{Board, KnowledgeBase, Point, choose_move};
use rand::SeedableRng;
use rand::rngs::StdRng;
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

/// Exhaustive oracle over the observations made so far.
struct Oracle<'a> {
    solver: Solver<'a>,
    vars: HashMap<Point, Var>,
}

impl Oracle<'_> {
    fn new(height: usize, width: usize, observations: &[(Point, usize)]) -> Self {
        let mut solver = Solver::new();
        let mut vars = HashMap::new();
        for row in 0..height {
            for col in 0..width {
                vars.insert(Point::new(row, col), solver.new_var());
            }
        }

        let mut formula = CnfFormula::new();
        for &(cell, count) in observations {
            // A probed cell is never a mine
            formula.add_clause(&[Lit::from_var(vars[&cell], false)]);

            let lits: Vec<Lit> = cell
                .neighbors(height, width)
                .map(|neighbor| Lit::from_var(vars[&neighbor], true))
                .collect();
            encode_exactly_k(&mut formula, &lits, count);
        }
        solver.add_formula(&formula);

        Oracle { solver, vars }
    }

    /// Whether some assignment consistent with the observations gives `cell`
    /// the requested status.
    fn possible(&mut self, cell: Point, mine: bool) -> bool {
        self.solver.assume(&[Lit::from_var(self.vars[&cell], mine)]);
        let result = self.solver.solve().unwrap_or(false);
        self.solver.assume(&[]);
        result
    }
}

/// Naive "exactly k" encoding; neighborhoods have at most eight cells.
fn encode_exactly_k(formula: &mut CnfFormula, lits: &[Lit], k: usize) {
    if k > lits.len() {
        formula.add_clause(&[]);
        return;
    }
    // At most k: every k + 1 cells contain a safe one
    for combo in lits.iter().copied().combinations(k + 1) {
        let clause: Vec<Lit> = combo.iter().map(|&lit| !lit).collect();
        formula.add_clause(&clause);
    }
    // At least k: every n - k + 1 cells contain a mine
    if k > 0 {
        for combo in lits.iter().copied().combinations(lits.len() - k + 1) {
            formula.add_clause(&combo);
        }
    }
}

fn assert_forced(knowledge: &KnowledgeBase, observations: &[(Point, usize)]) {
    let mut oracle = Oracle::new(knowledge.height(), knowledge.width(), observations);
    for &mine in knowledge.mines() {
        assert!(
            !oracle.possible(mine, false),
            "{mine} concluded mine but could be safe"
        );
    }
    for &safe in knowledge.safes() {
        assert!(
            !oracle.possible(safe, true),
            "{safe} concluded safe but could be a mine"
        );
    }
}

#[test]
fn test_deductions_are_forced_by_observations() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..25 {
        let board = Board::new(5, 6, 7, &mut rng).unwrap();
        let mut knowledge = KnowledgeBase::new(5, 6);
        let mut observations = Vec::new();

        while let Some(next) = choose_move(&knowledge, &mut rng) {
            let cell = next.point();
            if board.is_mine(cell) {
                break;
            }

            let count = board.nearby_mines(cell);
            knowledge.observe(cell, count).unwrap();
            observations.push((cell, count));
            assert_forced(&knowledge, &observations);
        }
    }
}

#[test]
fn test_deductions_match_true_board() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..50 {
        let board = Board::new(8, 8, 10, &mut rng).unwrap();
        let mut knowledge = KnowledgeBase::new(8, 8);

        while let Some(next) = choose_move(&knowledge, &mut rng) {
            let cell = next.point();
            if board.is_mine(cell) {
                break;
            }
            knowledge.observe(cell, board.nearby_mines(cell)).unwrap();
        }

        assert!(knowledge.mines().is_disjoint(knowledge.safes()));
        assert!(knowledge.mines().iter().all(|&mine| board.is_mine(mine)));
        assert!(knowledge.safes().iter().all(|&safe| !board.is_mine(safe)));
    }
}

#[test]
fn test_zero_observation_leaves_nothing_undecided_nearby() {
    // Every neighbor of a zero is safe in every model, and the knowledge base
    // must find all of them
    let board = Board::with_mines(4, 4, [Point::new(3, 3)]).unwrap();
    let mut knowledge = KnowledgeBase::new(4, 4);
    let cell = Point::new(0, 0);
    knowledge.observe(cell, board.nearby_mines(cell)).unwrap();

    let mut oracle = Oracle::new(4, 4, &[(cell, 0)]);
    for neighbor in cell.neighbors(4, 4) {
        assert!(!oracle.possible(neighbor, true));
        assert!(knowledge.safes().contains(&neighbor));
    }
}
