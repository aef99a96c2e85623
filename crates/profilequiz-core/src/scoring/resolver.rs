//! Outcome resolution.
//!
//! Totals are summed per personality from the selected options of every
//! panel. The personality with the highest total wins; when several share the
//! maximum, one of them is drawn uniformly at random.
//!
//! A drawn winner is sticky: [`OutcomeResolver::resolve_keeping`] keeps a
//! previous winner as long as it is still among the tied leaders, so showing
//! the result again never re-rolls it.

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use super::matrix::ScoreMatrix;
use crate::quiz::PanelState;

/// Resolved result of a quiz run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub personality_index: usize,
    /// Total per personality, aligned with the personality list.
    pub scores: Vec<f64>,
    /// Every personality reaching the maximum total.
    pub winners: Vec<usize>,
    pub tie_break_used: bool,
}

/// Sums scores and picks the winner.
#[derive(Debug, Clone)]
pub struct OutcomeResolver {
    rng: Mcg128Xsl64,
}

impl Default for OutcomeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeResolver {
    /// Resolver with an entropy-seeded tie-break.
    pub fn new() -> Self {
        Self {
            rng: Mcg128Xsl64::from_entropy(),
        }
    }

    /// Resolver with a reproducible tie-break.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mcg128Xsl64::seed_from_u64(seed),
        }
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }

    /// Total per personality.
    ///
    /// Entries without a matching personality, or pointing past the list, are
    /// skipped.
    pub fn scores(panels: &[PanelState], matrix: &ScoreMatrix, personality_count: usize) -> Vec<f64> {
        let mut scores = vec![0.0; personality_count];

        for (question, panel) in panels.iter().enumerate() {
            for option in panel.selected() {
                for entry in matrix.entries(question, option) {
                    if let Some(total) = entry.personality_index.and_then(|index| scores.get_mut(index)) {
                        *total += entry.score;
                    }
                }
            }
        }

        scores
    }

    /// Personalities reaching the maximum of `scores`.
    pub fn leaders(scores: &[f64]) -> Vec<usize> {
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        scores
            .iter()
            .enumerate()
            .filter(|&(_, &score)| score == max)
            .map(|(index, _)| index)
            .collect()
    }

    /// Resolve a fresh outcome. `None` when there are no personalities.
    pub fn resolve(
        &mut self,
        panels: &[PanelState],
        matrix: &ScoreMatrix,
        personality_count: usize,
    ) -> Option<Outcome> {
        self.resolve_keeping(None, panels, matrix, personality_count)
    }

    /// Resolve, keeping `previous` if it is still one of the leaders.
    pub fn resolve_keeping(
        &mut self,
        previous: Option<usize>,
        panels: &[PanelState],
        matrix: &ScoreMatrix,
        personality_count: usize,
    ) -> Option<Outcome> {
        let scores = Self::scores(panels, matrix, personality_count);
        let winners = Self::leaders(&scores);
        let tie_break_used = winners.len() > 1;

        let personality_index = match previous.filter(|index| winners.contains(index)) {
            Some(kept) => kept,
            None => *winners.choose(&mut self.rng)?,
        };

        tracing::info!(
            personality_index,
            tie_break_used,
            kept = previous == Some(personality_index),
            "outcome resolved"
        );

        Some(Outcome {
            personality_index,
            scores,
            winners,
            tie_break_used,
        })
    }

    /// Outcome for a winner restored from session state.
    ///
    /// Totals are recomputed; the winner is taken as given even if the
    /// recomputed leaders differ.
    pub fn restored(
        personality_index: usize,
        panels: &[PanelState],
        matrix: &ScoreMatrix,
        personality_count: usize,
    ) -> Outcome {
        let scores = Self::scores(panels, matrix, personality_count);
        let winners = Self::leaders(&scores);
        Outcome {
            personality_index,
            tie_break_used: winners.len() > 1,
            scores,
            winners,
        }
    }
}
