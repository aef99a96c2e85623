//! Serializable session state.
//!
//! The host persists a [`SessionSnapshot`] between visits and hands it back
//! when the quiz is constructed again. The JSON shape is shared with the
//! authoring platform:
//!
//! ```text
//! { "panelIndex": 2,
//!   "answersGiven": [ { "question": 0, "options": [1] }, ... ],
//!   "panelsCompleted": [true, true, false],
//!   "results": "Explorer" }
//! ```
//!
//! `results` holds the name of the personality that was shown. It is stored
//! because a tie may have been broken at random and must not be re-rolled on
//! restore.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options chosen for one question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: usize,
    pub options: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel_index: Option<usize>,
    #[serde(default)]
    pub answers_given: Vec<AnswerRecord>,
    #[serde(default)]
    pub panels_completed: Vec<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<String>,
}

impl SessionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.panel_index.is_none()
            && self.answers_given.is_empty()
            && self.panels_completed.is_empty()
            && self.results.is_none()
    }

    /// Read a snapshot from arbitrary JSON, keeping whatever fields are usable.
    ///
    /// Fields with the wrong type fall back to their defaults instead of
    /// rejecting the whole snapshot; answer records that cannot be read are
    /// skipped.
    pub fn from_value_lenient(value: &Value) -> Self {
        let panel_index = value
            .get("panelIndex")
            .and_then(Value::as_u64)
            .and_then(|index| usize::try_from(index).ok());

        let answers_given = value
            .get("answersGiven")
            .and_then(Value::as_array)
            .map(|answers| {
                answers
                    .iter()
                    .filter_map(|answer| {
                        let record = AnswerRecord::deserialize(answer).ok();
                        if record.is_none() {
                            tracing::warn!(%answer, "skipping unreadable answer record");
                        }
                        record
                    })
                    .collect()
            })
            .unwrap_or_default();

        let panels_completed = value
            .get("panelsCompleted")
            .and_then(Value::as_array)
            .map(|flags| flags.iter().map(|flag| flag.as_bool().unwrap_or(false)).collect())
            .unwrap_or_default();

        let results = value
            .get("results")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Self {
            panel_index,
            answers_given,
            panels_completed,
            results,
        }
    }

    /// Parse stored JSON; anything unreadable yields an empty snapshot.
    pub fn from_json_lenient(json: &str) -> Self {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => Self::from_value_lenient(&value),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable session state");
                Self::default()
            }
        }
    }
}
