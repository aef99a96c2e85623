//! Quiz engine.
//!
//! [`Quiz`] is what a host embeds. It owns the sanitized content, the score
//! matrix, the navigation controller and the resolved outcome, and turns user
//! interactions into [`QuizEvent`]s. Like a timer engine it has no thread of
//! its own: a completion that waits for an option animation is kept as a
//! pending deadline and fired by the caller through [`Quiz::tick`].
//!
//! ## Screens
//!
//! ```text
//! Message                                 (setup error, terminal)
//! Intro -> Questions <-> Result           (Result -> Questions only by review)
//! ```

use std::rc::Rc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::navigation::{NavigationButtons, NavigationController, Transition};
use crate::content::{Image, QuizContent, Visualization};
use crate::error::{ExportError, QuizSetupError};
use crate::events::QuizEvent;
use crate::export::{ElementParams, ExportElement};
use crate::scoring::{Outcome, OutcomeResolver, ScoreMatrix};
use crate::services::{HostServices, Localizer, Verb};
use crate::session::{AnswerRecord, SessionSnapshot};
use crate::storage::{QuizConfig, ResultAnimation};

/// Time the option animation plays before a chat panel completes.
pub const COMPLETION_DELAY_MS: u64 = 300;

const EXPORT_TITLE_SIZE: u32 = 20;
const EXPORT_PERSONALITY_SIZE: u32 = 16;

/// What the quiz currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Screen {
    /// Localized hint shown instead of the quiz when setup failed.
    Message(String),
    Intro,
    Questions,
    Result,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetOptions {
    /// Discard restored answers and position.
    pub clean_slate: bool,
}

/// Result summary for the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizResults {
    pub title: Option<String>,
    pub personality: Option<String>,
    pub description: Option<String>,
    pub visualization: Option<Visualization>,
}

/// Position report for confusion reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizContext {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// 1-based question position.
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub text: String,
    pub selected: bool,
}

/// One question with the state of its options, as listed on the result screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub question: String,
    pub options: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingCompletion {
    panel_index: usize,
    due_epoch_ms: u64,
}

pub struct Quiz {
    content: QuizContent,
    config: QuizConfig,
    host: Rc<dyn HostServices>,
    dictionary: Rc<dyn Localizer>,
    setup_error: Option<QuizSetupError>,
    matrix: ScoreMatrix,
    navigation: NavigationController,
    resolver: OutcomeResolver,
    /// State handed over by the host, consumed by the first reset.
    previous_state: SessionSnapshot,
    outcome: Option<Outcome>,
    screen: Screen,
    is_reviewing: bool,
    pending: Option<PendingCompletion>,
    content_was_reset: bool,
}

impl Quiz {
    /// Build a quiz from authored content.
    ///
    /// Content is sanitized first. Unless the run is delegated to a parent,
    /// the quiz resets right away so it is ready to show.
    pub fn new(
        content: QuizContent,
        config: QuizConfig,
        host: Rc<dyn HostServices>,
        dictionary: Rc<dyn Localizer>,
        previous_state: Option<SessionSnapshot>,
    ) -> Self {
        let content = content.sanitized();

        let setup_error = if content.personalities.is_empty() {
            Some(QuizSetupError::NoPersonalities)
        } else if content.questions.is_empty() {
            Some(QuizSetupError::NoQuestions)
        } else {
            None
        };

        let screen = match setup_error {
            Some(error) => {
                tracing::warn!(%error, "quiz cannot run");
                Screen::Message(dictionary.get(error.l10n_key()))
            }
            None => Screen::Questions,
        };

        let mut quiz = Self {
            matrix: ScoreMatrix::build(&content.questions, &content.personalities),
            navigation: NavigationController::new(
                &content.questions,
                config.appearance(),
                config.allow_review(),
            ),
            resolver: OutcomeResolver::from_seed_option(config.behaviour.tie_break_seed),
            content,
            config,
            host,
            dictionary,
            setup_error,
            previous_state: previous_state.unwrap_or_default(),
            outcome: None,
            screen,
            is_reviewing: false,
            pending: None,
            content_was_reset: false,
        };

        if !quiz.config.behaviour.delegate_run {
            quiz.reset(ResetOptions::default());
        }
        quiz
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn content(&self) -> &QuizContent {
        &self.content
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn setup_error(&self) -> Option<QuizSetupError> {
        self.setup_error
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn buttons(&self) -> NavigationButtons {
        self.navigation.buttons()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn is_reviewing(&self) -> bool {
        self.is_reviewing
    }

    /// Whether a panel completion is waiting for [`Quiz::tick`].
    pub fn has_pending_completion(&self) -> bool {
        self.pending.is_some()
    }

    pub fn current_position(&self) -> usize {
        self.navigation.current_panel_index()
    }

    pub fn answer_given(&self) -> bool {
        self.navigation.answer_given()
    }

    pub fn answers_given(&self) -> Vec<AnswerRecord> {
        self.navigation.answers_given()
    }

    pub fn panels_completed(&self) -> Vec<bool> {
        self.navigation.panels_completed()
    }

    /// Current totals per personality.
    pub fn scores(&self) -> Vec<f64> {
        OutcomeResolver::scores(
            self.navigation.panels(),
            &self.matrix,
            self.content.personalities.len(),
        )
    }

    /// Name of the personality on the result screen.
    pub fn result_personality(&self) -> Option<&str> {
        self.outcome
            .as_ref()
            .and_then(|outcome| self.content.personalities.get(outcome.personality_index))
            .map(|personality| personality.name.as_str())
    }

    /// Snapshot of the session, `None` while the quiz cannot run.
    pub fn current_state(&self) -> Option<SessionSnapshot> {
        if self.setup_error.is_some() {
            return None;
        }

        Some(SessionSnapshot {
            panel_index: Some(self.current_position()),
            answers_given: self.answers_given(),
            panels_completed: self.panels_completed(),
            results: self.result_personality().map(str::to_string),
        })
    }

    /// State the host should store.
    ///
    /// Without any answer there is nothing worth storing, except that an
    /// explicit [`Quiz::reset_task`] must overwrite what was stored before,
    /// so an empty snapshot is returned then.
    pub fn persistable_state(&self) -> Option<SessionSnapshot> {
        if !self.answer_given() {
            return self.content_was_reset.then(SessionSnapshot::default);
        }
        self.current_state()
    }

    pub fn results(&self) -> QuizResults {
        let personality = self
            .outcome
            .as_ref()
            .and_then(|outcome| self.content.personalities.get(outcome.personality_index));

        QuizResults {
            title: self.content.title.clone(),
            personality: personality.map(|p| p.name.clone()),
            description: personality.and_then(|p| p.description.clone()),
            visualization: personality.and_then(|p| p.visualization.clone()),
        }
    }

    pub fn context(&self) -> QuizContext {
        let value = if self.setup_error.is_some() {
            self.previous_state.answers_given.len() + 1
        } else {
            self.current_position() + 1
        };
        QuizContext { kind: "question", value }
    }

    /// Every question with its options and whether they are selected.
    pub fn choices(&self) -> Vec<Choice> {
        self.content
            .questions
            .iter()
            .zip(self.navigation.panels())
            .map(|(question, panel)| Choice {
                question: question.text.clone(),
                options: question
                    .answers
                    .iter()
                    .enumerate()
                    .map(|(index, answer)| ChoiceOption {
                        text: answer.text.clone(),
                        selected: panel.is_selected(index),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Localized progress label, e.g. "2 of 5".
    pub fn progress_text(&self) -> Option<String> {
        if !self.config.visual.show_progress_bar || self.setup_error.is_some() {
            return None;
        }

        Some(
            self.dictionary
                .get("l10n.currentOfTotal")
                .replace("@current", &self.navigation.progress().to_string())
                .replace("@total", &self.navigation.panel_count().to_string()),
        )
    }

    /// Layout of the result document.
    ///
    /// # Errors
    ///
    /// [`ExportError::NoResult`] while no outcome has been resolved.
    pub fn export_elements(&self) -> Result<Vec<ExportElement>, ExportError> {
        let outcome = self.outcome.as_ref().ok_or(ExportError::NoResult)?;
        let personality = self
            .content
            .personalities
            .get(outcome.personality_index)
            .ok_or(ExportError::NoResult)?;
        let result_screen = &self.config.result_screen;

        let mut elements = vec![ExportElement::text(
            result_screen.export_title.clone(),
            ElementParams::heading(EXPORT_TITLE_SIZE),
        )];

        if result_screen.display_title {
            elements.push(ExportElement::text(
                personality.name.clone(),
                ElementParams::heading(EXPORT_PERSONALITY_SIZE),
            ));
        }

        let image_path = personality
            .visualization
            .as_ref()
            .and_then(|visualization| visualization.params.pointer("/file/path"))
            .and_then(serde_json::Value::as_str);
        if let Some(path) = image_path {
            elements.push(ExportElement::image(Image {
                path: path.to_string(),
                alt: Some(personality.name.clone()),
            }));
        }

        if result_screen.display_description {
            if let Some(description) = &personality.description {
                elements.push(ExportElement::text(
                    crate::content::purify_html(description),
                    ElementParams::default(),
                ));
            }
        }

        if result_screen.display_options_chosen {
            elements.push(ExportElement::text(
                self.dictionary.get("l10n.yourChoices"),
                ElementParams::bold(),
            ));
            for choice in self.choices() {
                elements.push(ExportElement::text(choice.question, ElementParams::bold()));
                for option in choice.options.into_iter().filter(|option| option.selected) {
                    elements.push(ExportElement::text(
                        format!("- {}", option.text),
                        ElementParams::default(),
                    ));
                }
            }
        }

        Ok(elements)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Host entry point for delegated runs. Same as [`Quiz::reset`].
    pub fn run(&mut self) -> Vec<QuizEvent> {
        self.reset(ResetOptions::default())
    }

    /// Bring the quiz into its initial state.
    ///
    /// The state handed over at construction is applied by the first reset
    /// only. A restored result is kept as is, so a tie that was broken once
    /// is not drawn again.
    pub fn reset(&mut self, options: ResetOptions) -> Vec<QuizEvent> {
        if self.setup_error.is_some() {
            return Vec::new();
        }

        self.is_reviewing = false;
        self.pending = None;
        self.outcome = None;

        let previous = std::mem::take(&mut self.previous_state);
        if options.clean_slate {
            self.navigation.reset(&[], Some(0), &[]);
        } else {
            self.navigation.reset(
                &previous.answers_given,
                previous.panel_index,
                &previous.panels_completed,
            );
            if let Some(name) = previous.results.as_deref() {
                self.outcome = self.restored_outcome(name);
            }
        }

        let mut events = vec![QuizEvent::QuizReset {
            clean_slate: options.clean_slate,
            at: Utc::now(),
        }];

        let finished = self.navigation.is_finished();
        let delegate_run = self.config.behaviour.delegate_run;
        let show_title_screen = self.config.behaviour.show_title_screen;
        if delegate_run && !finished {
            events.push(self.show_questions());
        } else if show_title_screen && !self.answer_given() {
            self.screen = Screen::Intro;
            self.host.read(&self.dictionary.get("a11y.titleScreenWasOpened"));
            events.push(QuizEvent::IntroShown { at: Utc::now() });
        } else if !finished {
            events.push(self.show_questions());
        } else {
            events.extend(self.handle_completed(true));
        }

        self.host.resize();
        events
    }

    /// Reset requested by the user. Starts over from scratch.
    pub fn reset_task(&mut self) -> Vec<QuizEvent> {
        self.content_was_reset = true;
        self.reset(ResetOptions { clean_slate: true })
    }

    /// Leave the title screen.
    pub fn start(&mut self) -> Vec<QuizEvent> {
        if self.screen != Screen::Intro {
            return Vec::new();
        }

        let mut events = vec![QuizEvent::TitleScreenClosed { at: Utc::now() }];
        events.push(self.show_questions());
        self.host.resize();
        events
    }

    /// Toggle an option of the active panel.
    pub fn choose_option(&mut self, option: usize) -> Vec<QuizEvent> {
        self.choose_option_at(option, now_ms())
    }

    /// [`Quiz::choose_option`] with an explicit clock.
    pub fn choose_option_at(&mut self, option: usize, now_epoch_ms: u64) -> Vec<QuizEvent> {
        if self.screen != Screen::Questions {
            return Vec::new();
        }
        let Some(choice) = self.navigation.choose_option(option) else {
            return Vec::new();
        };

        let selected = self
            .navigation
            .panel(choice.panel_index)
            .map(|panel| panel.selected_indexes())
            .unwrap_or_default();
        let mut events = vec![QuizEvent::OptionChosen {
            panel_index: choice.panel_index,
            change: choice.change,
            selected,
            buttons: self.navigation.buttons(),
            at: Utc::now(),
        }];

        if choice.completes_panel {
            if self.config.visual.is_animation_on {
                let due_epoch_ms = now_epoch_ms + COMPLETION_DELAY_MS;
                self.pending = Some(PendingCompletion {
                    panel_index: choice.panel_index,
                    due_epoch_ms,
                });
                events.push(QuizEvent::CompletionScheduled {
                    panel_index: choice.panel_index,
                    due_epoch_ms,
                    at: Utc::now(),
                });
            } else {
                events.extend(self.complete_panel(choice.panel_index));
            }
        }

        events
    }

    /// Finish a multi-select chat panel.
    pub fn done(&mut self) -> Vec<QuizEvent> {
        if self.screen != Screen::Questions {
            return Vec::new();
        }
        let panel_index = self.current_position();
        match self.navigation.done() {
            Transition::Ignored => Vec::new(),
            transition => {
                let mut events = vec![QuizEvent::PanelCompleted {
                    panel_index,
                    at: Utc::now(),
                }];
                events.extend(self.follow(transition));
                events
            }
        }
    }

    pub fn next(&mut self) -> Vec<QuizEvent> {
        if self.screen != Screen::Questions {
            return Vec::new();
        }
        let transition = self.navigation.next();
        self.follow(transition)
    }

    pub fn previous(&mut self) -> Vec<QuizEvent> {
        if self.screen != Screen::Questions {
            return Vec::new();
        }
        let transition = self.navigation.previous();
        self.follow(transition)
    }

    /// Fire a pending completion once it is due.
    pub fn tick(&mut self) -> Vec<QuizEvent> {
        self.tick_at(now_ms())
    }

    /// [`Quiz::tick`] with an explicit clock.
    pub fn tick_at(&mut self, now_epoch_ms: u64) -> Vec<QuizEvent> {
        let Some(pending) = self.pending else {
            return Vec::new();
        };
        if now_epoch_ms < pending.due_epoch_ms {
            return Vec::new();
        }
        self.pending = None;

        // The choice may have been taken back while the animation played
        let still_answered = self
            .navigation
            .panel(pending.panel_index)
            .map(|panel| panel.answer_given())
            .unwrap_or(false);
        if !still_answered {
            return Vec::new();
        }

        self.complete_panel(pending.panel_index)
    }

    /// Go back from the result to the last question.
    pub fn review(&mut self) -> Vec<QuizEvent> {
        if self.screen != Screen::Result {
            return Vec::new();
        }

        match self.navigation.review() {
            Transition::Moved { to, .. } => {
                self.is_reviewing = true;
                tracing::debug!(panel_index = to, "review started");
                let mut events = vec![QuizEvent::ReviewStarted {
                    panel_index: to,
                    at: Utc::now(),
                }];
                events.push(self.show_questions());
                self.host.resize();
                events
            }
            _ => Vec::new(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_panel(&mut self, panel_index: usize) -> Vec<QuizEvent> {
        match self.navigation.complete_panel(panel_index) {
            Transition::Ignored => Vec::new(),
            transition => {
                let mut events = vec![QuizEvent::PanelCompleted {
                    panel_index,
                    at: Utc::now(),
                }];
                events.extend(self.follow(transition));
                events
            }
        }
    }

    fn follow(&mut self, transition: Transition) -> Vec<QuizEvent> {
        match transition {
            Transition::Ignored => Vec::new(),
            Transition::Moved { .. } => {
                let event = self.show_questions();
                self.host.resize();
                vec![event]
            }
            Transition::Completed => self.handle_completed(false),
        }
    }

    fn show_questions(&mut self) -> QuizEvent {
        self.screen = Screen::Questions;
        self.host.trigger_event(Verb::Progressed);
        QuizEvent::PanelShown {
            panel_index: self.current_position(),
            progress: self.navigation.progress(),
            buttons: self.navigation.buttons(),
            at: Utc::now(),
        }
    }

    /// All questions passed.
    ///
    /// A fresh outcome is resolved on a genuine completion. A completion
    /// replayed by reset keeps a result that is already there.
    fn handle_completed(&mut self, from_reset: bool) -> Vec<QuizEvent> {
        self.pending = None;
        let mut events = Vec::new();

        let update = self.is_reviewing || self.outcome.is_none() || !from_reset;
        if update {
            let previous = self.outcome.as_ref().map(|outcome| outcome.personality_index);
            self.outcome = self.resolver.resolve_keeping(
                previous,
                self.navigation.panels(),
                &self.matrix,
                self.content.personalities.len(),
            );

            if let Some(outcome) = &self.outcome {
                let name = self
                    .content
                    .personalities
                    .get(outcome.personality_index)
                    .map(|personality| personality.name.clone())
                    .unwrap_or_default();
                events.push(QuizEvent::Completed {
                    personality_index: outcome.personality_index,
                    personality: name,
                    scores: outcome.scores.clone(),
                    tie_break_used: outcome.tie_break_used,
                    at: Utc::now(),
                });
            }
            self.host.trigger_event(Verb::Completed);
        }

        if self.config.behaviour.delegate_results {
            return events;
        }

        if !from_reset {
            if let Some(text) = self.results_announcement() {
                self.host.read(&text);
            }
        }

        let animation = match self.config.result_animation() {
            ResultAnimation::Wheel if from_reset => ResultAnimation::None,
            animation => animation,
        };

        self.screen = Screen::Result;
        events.push(QuizEvent::ResultShown {
            personality_index: self.outcome.as_ref().map(|outcome| outcome.personality_index),
            animation,
            from_reset,
            at: Utc::now(),
        });
        self.host.resize();
        events
    }

    fn results_announcement(&self) -> Option<String> {
        let outcome = self.outcome.as_ref()?;
        let personality = self.content.personalities.get(outcome.personality_index)?;

        let mut text = format!("{} {}", self.dictionary.get("a11y.resultsTitle"), personality.name);
        if self.config.result_screen.display_description {
            if let Some(description) = &personality.description {
                text.push_str(". ");
                text.push_str(&crate::content::purify_html(description));
            }
        }
        Some(text)
    }

    fn restored_outcome(&self, name: &str) -> Option<Outcome> {
        let Some((index, _)) = self.content.personality_by_name(name) else {
            tracing::warn!(name, "stored result names no known personality");
            return None;
        };

        Some(OutcomeResolver::restored(
            index,
            self.navigation.panels(),
            &self.matrix,
            self.content.personalities.len(),
        ))
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
