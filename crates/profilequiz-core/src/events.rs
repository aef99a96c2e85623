use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quiz::{NavigationButtons, SelectionChange};
use crate::storage::ResultAnimation;

/// Every state change of a quiz produces an Event.
/// Front ends render from them; hosts may log or forward them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuizEvent {
    /// Title screen was shown.
    IntroShown {
        at: DateTime<Utc>,
    },
    TitleScreenClosed {
        at: DateTime<Utc>,
    },
    /// A question panel became the active one.
    PanelShown {
        panel_index: usize,
        /// 1-based position for the progress indicator.
        progress: usize,
        buttons: NavigationButtons,
        at: DateTime<Utc>,
    },
    OptionChosen {
        panel_index: usize,
        change: SelectionChange,
        selected: Vec<usize>,
        buttons: NavigationButtons,
        at: DateTime<Utc>,
    },
    /// Panel completion was deferred until the option animation has played.
    CompletionScheduled {
        panel_index: usize,
        due_epoch_ms: u64,
        at: DateTime<Utc>,
    },
    /// Chat panel locked after its answer.
    PanelCompleted {
        panel_index: usize,
        at: DateTime<Utc>,
    },
    /// A new outcome was resolved.
    Completed {
        personality_index: usize,
        personality: String,
        scores: Vec<f64>,
        tie_break_used: bool,
        at: DateTime<Utc>,
    },
    ResultShown {
        personality_index: Option<usize>,
        animation: ResultAnimation,
        /// Shown while restoring a finished session.
        from_reset: bool,
        at: DateTime<Utc>,
    },
    ReviewStarted {
        panel_index: usize,
        at: DateTime<Utc>,
    },
    QuizReset {
        clean_slate: bool,
        at: DateTime<Utc>,
    },
}
