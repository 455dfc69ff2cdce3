//! A knowledge-based Minesweeper player.
//!
//! The [`KnowledgeBase`] ingests observations ("this cell has N mines among
//! its neighbors") as [`Constraint`]s and closes over them with direct
//! propagation and subset resolution, proving cells safe or mined. The
//! [`Board`] and [`Bot`] around it exist to play actual games.

mod board;
mod bot;
mod constraint;
mod error;
mod knowledge;
mod point;

pub use board::Board;
pub use bot::{Bot, GameState, Move, choose_move};
pub use constraint::Constraint;
pub use error::KnowledgeError;
pub use knowledge::{Deductions, KnowledgeBase};
pub use point::Point;
