//! Scoring: weight compilation and outcome resolution.

pub mod matrix;
pub mod resolver;

pub use matrix::{ScoreEntry, ScoreMatrix};
pub use resolver::{Outcome, OutcomeResolver};
