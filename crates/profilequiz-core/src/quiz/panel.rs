//! Per-question selection state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::session::AnswerRecord;

/// What a click on an option did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionChange {
    Selected { option: usize },
    Deselected { option: usize },
    /// Single-select panel switched from one option to another.
    Replaced { from: usize, to: usize },
    /// Option out of range, or the panel is locked.
    Ignored,
}

/// Selection state of one question.
///
/// Single-select panels hold at most one option. A completed panel is locked:
/// further clicks are ignored until it is reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelState {
    option_count: usize,
    allows_multiple: bool,
    selected: BTreeSet<usize>,
    completed: bool,
}

impl PanelState {
    pub fn new(option_count: usize, allows_multiple: bool) -> Self {
        Self {
            option_count,
            allows_multiple,
            selected: BTreeSet::new(),
            completed: false,
        }
    }

    pub fn option_count(&self) -> usize {
        self.option_count
    }

    pub fn allows_multiple(&self) -> bool {
        self.allows_multiple
    }

    pub fn is_selected(&self, option: usize) -> bool {
        self.selected.contains(&option)
    }

    /// Selected option indexes in ascending order.
    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }

    pub fn selected_indexes(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    pub fn answer_given(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    /// Whether an explicit "done" may finish this panel.
    pub fn can_finish(&self) -> bool {
        !self.completed && self.answer_given()
    }

    /// Toggle an option.
    ///
    /// Clicking the selected option of a single-select panel clears the
    /// answer; clicking another one replaces it.
    pub fn toggle_option(&mut self, option: usize) -> SelectionChange {
        if self.completed || option >= self.option_count {
            return SelectionChange::Ignored;
        }

        if self.selected.remove(&option) {
            return SelectionChange::Deselected { option };
        }

        if self.allows_multiple {
            self.selected.insert(option);
            return SelectionChange::Selected { option };
        }

        let previous = self.selected.pop_first();
        self.selected.insert(option);
        match previous {
            Some(from) => SelectionChange::Replaced { from, to: option },
            None => SelectionChange::Selected { option },
        }
    }

    /// Replace the selection with previously chosen options.
    ///
    /// Indexes outside the panel are dropped; a single-select panel keeps only
    /// the first remaining one.
    pub fn reset(&mut self, options_chosen: &[usize], completed: bool) {
        self.selected.clear();
        for &option in options_chosen.iter().filter(|&&option| option < self.option_count) {
            if !self.allows_multiple && !self.selected.is_empty() {
                break;
            }
            self.selected.insert(option);
        }
        self.completed = completed;
    }

    /// Serializable answer, `None` while nothing is selected.
    pub fn answer_record(&self, question: usize) -> Option<AnswerRecord> {
        self.answer_given().then(|| AnswerRecord {
            question,
            options: self.selected_indexes(),
        })
    }
}
