//! Navigation controller.
//!
//! Owns the panel states and the index of the active panel. The index runs
//! from `0` to `panel_count`; `panel_count` itself means every question has
//! been passed and the result is due.
//!
//! ## Appearances
//!
//! ```text
//! classic:  Q0 <-> Q1 <-> ... <-> Qn-1 -> Result     (next gated by answers)
//! chat:     Q0  -> Q1  -> ...  -> Qn-1 -> Result     (forward only)
//! ```
//!
//! In classic mode "next" is enabled while the active panel lies before the
//! first unanswered one, and "previous" whenever the active panel is not the
//! first (and review is allowed). In chat mode every move must go forward,
//! finishing a panel advances immediately and passed panels are locked.

use serde::{Deserialize, Serialize};

use super::panel::{PanelState, SelectionChange};
use crate::content::Question;
use crate::session::AnswerRecord;

/// Presentation mode of the question screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    /// Paged, with previous/next controls.
    #[default]
    Classic,
    /// Sequential transcript that only moves forward.
    Chat,
}

/// Enabled state of the navigation bar (classic mode only).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationButtons {
    pub previous: bool,
    pub next: bool,
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    Ignored,
    Moved { from: usize, to: usize },
    /// Moved past the last question.
    Completed,
}

/// What choosing an option did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceOutcome {
    pub panel_index: usize,
    pub change: SelectionChange,
    /// The panel is finished by this choice and should complete (chat mode,
    /// single select).
    pub completes_panel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationController {
    appearance: Appearance,
    allow_review: bool,
    panels: Vec<PanelState>,
    current_panel_index: usize,
    buttons: NavigationButtons,
}

impl NavigationController {
    pub fn new(questions: &[Question], appearance: Appearance, allow_review: bool) -> Self {
        let panels = questions
            .iter()
            .map(|question| PanelState::new(question.answers.len(), question.allows_multiple_choices))
            .collect();

        let mut controller = Self {
            appearance,
            allow_review,
            panels,
            current_panel_index: 0,
            buttons: NavigationButtons::default(),
        };
        controller.update_buttons();
        controller
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn appearance(&self) -> Appearance {
        self.appearance
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn current_panel_index(&self) -> usize {
        self.current_panel_index
    }

    /// Whether every question has been passed.
    pub fn is_finished(&self) -> bool {
        self.current_panel_index >= self.panels.len()
    }

    pub fn panels(&self) -> &[PanelState] {
        &self.panels
    }

    pub fn panel(&self, index: usize) -> Option<&PanelState> {
        self.panels.get(index)
    }

    pub fn current_panel(&self) -> Option<&PanelState> {
        self.panels.get(self.current_panel_index)
    }

    pub fn buttons(&self) -> NavigationButtons {
        self.buttons
    }

    /// 1-based position shown by the progress indicator.
    pub fn progress(&self) -> usize {
        (self.current_panel_index + 1).min(self.panels.len())
    }

    /// Index of the first panel without an answer, `panel_count` if all are
    /// answered.
    pub fn first_unanswered_index(&self) -> usize {
        self.panels
            .iter()
            .position(|panel| !panel.answer_given())
            .unwrap_or(self.panels.len())
    }

    pub fn answer_given(&self) -> bool {
        self.panels.iter().any(PanelState::answer_given)
    }

    pub fn answers_given(&self) -> Vec<AnswerRecord> {
        self.panels
            .iter()
            .enumerate()
            .filter_map(|(index, panel)| panel.answer_record(index))
            .collect()
    }

    pub fn panels_completed(&self) -> Vec<bool> {
        self.panels.iter().map(PanelState::is_completed).collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Move to a panel.
    ///
    /// Negative indexes are ignored, as is any backward or same-panel move in
    /// chat mode. An index at or past the last panel finishes the quiz.
    pub fn move_to_panel(&mut self, index: isize) -> Transition {
        let Ok(index) = usize::try_from(index) else {
            return Transition::Ignored;
        };

        if self.appearance == Appearance::Chat && index <= self.current_panel_index {
            return Transition::Ignored;
        }

        let from = self.current_panel_index;
        if index >= self.panels.len() {
            if self.appearance == Appearance::Chat {
                self.lock_panels_before(self.panels.len());
            }
            self.current_panel_index = self.panels.len();
            self.update_buttons();
            tracing::debug!(from, "all panels passed");
            return Transition::Completed;
        }

        self.current_panel_index = index;
        if self.appearance == Appearance::Chat {
            self.lock_panels_before(index);
        }
        self.update_buttons();
        tracing::debug!(from, to = index, "moved to panel");
        Transition::Moved { from, to: index }
    }

    /// Classic "next" button.
    pub fn next(&mut self) -> Transition {
        if self.appearance != Appearance::Classic || !self.buttons.next {
            return Transition::Ignored;
        }
        self.move_to_panel(self.current_panel_index as isize + 1)
    }

    /// Classic "previous" button.
    pub fn previous(&mut self) -> Transition {
        if self.appearance != Appearance::Classic || !self.buttons.previous {
            return Transition::Ignored;
        }
        self.move_to_panel(self.current_panel_index as isize - 1)
    }

    /// Toggle an option of the active panel.
    pub fn choose_option(&mut self, option: usize) -> Option<ChoiceOutcome> {
        let panel_index = self.current_panel_index;
        let appearance = self.appearance;
        let panel = self.panels.get_mut(panel_index)?;

        let change = panel.toggle_option(option);
        if change == SelectionChange::Ignored {
            return None;
        }

        let completes_panel =
            appearance == Appearance::Chat && !panel.allows_multiple() && panel.answer_given();

        self.update_buttons();
        Some(ChoiceOutcome {
            panel_index,
            change,
            completes_panel,
        })
    }

    /// Explicit "done" of a multi-select chat panel.
    pub fn done(&mut self) -> Transition {
        let can_finish = self.appearance == Appearance::Chat
            && self
                .current_panel()
                .map(|panel| panel.allows_multiple() && panel.can_finish())
                .unwrap_or(false);

        if !can_finish {
            return Transition::Ignored;
        }
        self.complete_panel(self.current_panel_index)
    }

    /// A panel finished its answer sequence.
    ///
    /// Only chat mode reacts: the panel is locked and the transcript advances.
    /// A panel that is already completed does not fire twice.
    pub fn complete_panel(&mut self, panel_index: usize) -> Transition {
        if self.appearance != Appearance::Chat {
            return Transition::Ignored;
        }

        let Some(panel) = self.panels.get_mut(panel_index) else {
            return Transition::Ignored;
        };
        if panel.is_completed() {
            return Transition::Ignored;
        }
        panel.set_completed(true);

        self.move_to_panel(panel_index as isize + 1)
    }

    /// Return from the result to the last question (classic mode with review).
    pub fn review(&mut self) -> Transition {
        if self.appearance != Appearance::Classic || !self.allow_review || self.panels.is_empty() {
            return Transition::Ignored;
        }
        self.move_to_panel(self.panels.len() as isize - 1)
    }

    /// Restore selections and position.
    ///
    /// `panel_index` takes precedence over the number of answers for
    /// positioning and is clamped to `[0, panel_count]`. Completed flags only
    /// exist in chat mode and only apply before the position, so the active
    /// panel always stays answerable. A missing flag counts as completed.
    pub fn reset(
        &mut self,
        answers_given: &[AnswerRecord],
        panel_index: Option<usize>,
        panels_completed: &[bool],
    ) {
        let position = panel_index
            .unwrap_or(answers_given.len())
            .min(self.panels.len());
        self.current_panel_index = position;

        let appearance = self.appearance;
        for (index, panel) in self.panels.iter_mut().enumerate() {
            let options: &[usize] = answers_given
                .iter()
                .find(|answer| answer.question == index)
                .map(|answer| answer.options.as_slice())
                .unwrap_or(&[]);
            let completed = appearance == Appearance::Chat
                && index < position
                && panels_completed.get(index).copied().unwrap_or(true);
            panel.reset(options, completed);
        }

        self.update_buttons();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn lock_panels_before(&mut self, index: usize) {
        for panel in self.panels.iter_mut().take(index) {
            panel.set_completed(true);
        }
    }

    fn update_buttons(&mut self) {
        self.buttons = match self.appearance {
            Appearance::Classic => NavigationButtons {
                previous: self.allow_review && self.current_panel_index != 0,
                next: self.current_panel_index < self.first_unanswered_index(),
            },
            Appearance::Chat => NavigationButtons::default(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::AnswerOption;

    fn questions(count: usize) -> Vec<Question> {
        (0..count)
            .map(|i| {
                Question::new(
                    format!("q{i}"),
                    vec![AnswerOption::new("a", "a=1"), AnswerOption::new("b", "b=1")],
                )
            })
            .collect()
    }

    fn classic(count: usize) -> NavigationController {
        NavigationController::new(&questions(count), Appearance::Classic, true)
    }

    fn chat(count: usize) -> NavigationController {
        NavigationController::new(&questions(count), Appearance::Chat, false)
    }

    #[test]
    fn classic_next_follows_first_unanswered() {
        let mut nav = classic(3);
        assert!(!nav.buttons().next);
        assert!(!nav.buttons().previous);

        nav.choose_option(0);
        assert!(nav.buttons().next);

        assert_eq!(nav.next(), Transition::Moved { from: 0, to: 1 });
        assert!(!nav.buttons().next);
        assert!(nav.buttons().previous);
    }

    #[test]
    fn classic_next_disabled_ignores_request() {
        let mut nav = classic(2);
        assert_eq!(nav.next(), Transition::Ignored);
        assert_eq!(nav.current_panel_index(), 0);
    }

    #[test]
    fn classic_moves_back_to_answered_panels() {
        let mut nav = classic(3);
        nav.choose_option(1);
        nav.next();
        nav.choose_option(0);
        nav.next();

        assert_eq!(nav.previous(), Transition::Moved { from: 2, to: 1 });
        assert_eq!(nav.previous(), Transition::Moved { from: 1, to: 0 });
        assert_eq!(nav.previous(), Transition::Ignored);
        // Both visited panels answered, so next stays enabled on the way back
        assert!(nav.buttons().next);
    }

    #[test]
    fn classic_without_review_has_no_previous() {
        let mut nav = NavigationController::new(&questions(2), Appearance::Classic, false);
        nav.choose_option(0);
        nav.next();
        assert!(!nav.buttons().previous);
        assert_eq!(nav.previous(), Transition::Ignored);
    }

    #[test]
    fn classic_last_next_completes() {
        let mut nav = classic(1);
        nav.choose_option(0);
        assert_eq!(nav.next(), Transition::Completed);
        assert_eq!(nav.current_panel_index(), 1);
        assert!(nav.is_finished());
        assert!(!nav.buttons().next);
    }

    #[test]
    fn negative_index_is_ignored() {
        let mut nav = classic(2);
        assert_eq!(nav.move_to_panel(-1), Transition::Ignored);
        assert_eq!(nav.current_panel_index(), 0);
    }

    #[test]
    fn chat_never_moves_backwards() {
        let mut nav = chat(4);
        nav.move_to_panel(2);
        for index in [-1, 0, 1, 2] {
            assert_eq!(nav.move_to_panel(index), Transition::Ignored);
            assert_eq!(nav.current_panel_index(), 2);
        }
    }

    #[test]
    fn chat_move_locks_earlier_panels() {
        let mut nav = chat(3);
        nav.move_to_panel(2);
        assert_eq!(nav.panels_completed(), vec![true, true, false]);
    }

    #[test]
    fn chat_single_select_completes_panel() {
        let mut nav = chat(2);
        let outcome = nav.choose_option(1).unwrap();
        assert!(outcome.completes_panel);

        assert_eq!(nav.complete_panel(0), Transition::Moved { from: 0, to: 1 });
        // Completed panel does not fire a second time
        assert_eq!(nav.complete_panel(0), Transition::Ignored);
        assert_eq!(nav.current_panel_index(), 1);
    }

    #[test]
    fn chat_multi_select_needs_done() {
        let mut questions = questions(2);
        questions[0].allows_multiple_choices = true;
        let mut nav = NavigationController::new(&questions, Appearance::Chat, false);

        assert_eq!(nav.done(), Transition::Ignored);
        let outcome = nav.choose_option(0).unwrap();
        assert!(!outcome.completes_panel);
        nav.choose_option(1);

        assert_eq!(nav.done(), Transition::Moved { from: 0, to: 1 });
        assert_eq!(nav.panels()[0].selected_indexes(), vec![0, 1]);
    }

    #[test]
    fn classic_ignores_panel_completion() {
        let mut nav = classic(2);
        nav.choose_option(0);
        assert_eq!(nav.complete_panel(0), Transition::Ignored);
        assert!(!nav.panels()[0].is_completed());
    }

    #[test]
    fn review_returns_to_last_question() {
        let mut nav = classic(2);
        nav.choose_option(0);
        nav.next();
        nav.choose_option(0);
        nav.next();
        assert!(nav.is_finished());

        assert_eq!(nav.review(), Transition::Moved { from: 2, to: 1 });
    }

    #[test]
    fn chat_has_no_review() {
        let mut nav = chat(1);
        nav.choose_option(0);
        nav.complete_panel(0);
        assert_eq!(nav.review(), Transition::Ignored);
    }

    #[test]
    fn reset_prefers_panel_index_over_answer_count() {
        let mut nav = chat(3);
        let answers = vec![AnswerRecord { question: 0, options: vec![1] }];

        nav.reset(&answers, Some(2), &[]);
        assert_eq!(nav.current_panel_index(), 2);
        assert_eq!(nav.panels_completed(), vec![true, true, false]);

        nav.reset(&answers, None, &[]);
        assert_eq!(nav.current_panel_index(), 1);
    }

    #[test]
    fn reset_clamps_position_and_skips_unknown_questions() {
        let mut nav = classic(2);
        let answers = vec![AnswerRecord { question: 9, options: vec![0] }];
        nav.reset(&answers, Some(40), &[true, true]);

        assert_eq!(nav.current_panel_index(), 2);
        assert!(!nav.answer_given());
        // Completed flags are a chat concept
        assert_eq!(nav.panels_completed(), vec![false, false]);
    }

    #[test]
    fn reset_ignores_completed_flags_from_position_on() {
        let mut nav = chat(2);
        nav.reset(&[], Some(0), &[true, true]);
        assert_eq!(nav.panels_completed(), vec![false, false]);

        let outcome = nav.choose_option(0).unwrap();
        assert!(outcome.completes_panel);
        assert_eq!(nav.complete_panel(0), Transition::Moved { from: 0, to: 1 });
    }

    #[test]
    fn progress_is_one_based_and_capped() {
        let mut nav = classic(2);
        assert_eq!(nav.progress(), 1);
        nav.reset(&[], Some(2), &[]);
        assert_eq!(nav.progress(), 2);
    }
}
