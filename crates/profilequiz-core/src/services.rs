//! Collaborators injected into a [`Quiz`](crate::Quiz).
//!
//! The quiz never reaches for global state. Localized strings come from a
//! [`Localizer`], and everything the embedding host does on the quiz's behalf
//! (layout, announcements, tracking) goes through [`HostServices`].

use std::cell::RefCell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Localized string lookup. Pure.
pub trait Localizer {
    fn get(&self, key: &str) -> String;
}

/// Default English strings, keyed `l10n.*` and `a11y.*`.
const DEFAULT_STRINGS: &[(&str, &str)] = &[
    (
        "l10n.noQuestions",
        "It seems that there is no valid question set. Try checking for valid personality names.",
    ),
    (
        "l10n.noPersonalities",
        "It seems that there are not enough valid personalities set. Try checking for missing names or duplicate names.",
    ),
    ("l10n.start", "Start"),
    ("l10n.done", "Proceed"),
    ("l10n.currentOfTotal", "@current of @total"),
    ("l10n.skip", "Skip"),
    ("l10n.reset", "Restart"),
    ("l10n.download", "Download"),
    ("l10n.review", "Review answers"),
    ("l10n.notFinished", "The quiz was not finished yet."),
    ("l10n.yourChoices", "Your choices"),
    ("a11y.titleScreenWasOpened", "The title screen was opened."),
    ("a11y.wheelStarted", "The wheel of fortune started spinning. Please wait a moment."),
    ("a11y.progressBar", "Progress bar"),
    ("a11y.resultsTitle", "Here are your results."),
    ("a11y.standby", "Stand by."),
    ("a11y.previous", "Previous question"),
    ("a11y.next", "Next question"),
];

/// String table filled with defaults that authors may override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dictionary {
    entries: HashMap<String, String>,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self {
            entries: DEFAULT_STRINGS
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }
}

impl Dictionary {
    /// Override entries. Empty values keep the current string.
    pub fn fill<I, K, V>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in overrides {
            let value = value.into();
            if !value.trim().is_empty() {
                self.entries.insert(key.into(), value);
            }
        }
    }
}

impl Localizer for Dictionary {
    /// Unknown keys come back verbatim so a missing string stays visible.
    fn get(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

/// Tracking verbs the quiz emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Progressed,
    Completed,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Progressed => "progressed",
            Verb::Completed => "completed",
        }
    }
}

/// Services of the embedding host.
pub trait HostServices {
    /// Ask the host to re-measure the layout.
    fn resize(&self) {}

    /// Announce text to assistive technology.
    fn read(&self, _text: &str) {}

    /// Emit a tracking event.
    fn trigger_event(&self, _verb: Verb) {}

    /// Opaque identifier passed on to asset loading.
    fn content_id(&self) -> &str;
}

/// Host that ignores every request.
#[derive(Debug, Clone, Default)]
pub struct NoopHost {
    content_id: String,
}

impl NoopHost {
    pub fn new(content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
        }
    }
}

impl HostServices for NoopHost {
    fn content_id(&self) -> &str {
        &self.content_id
    }
}

/// A call received by a [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Resize,
    Read(String),
    Trigger(Verb),
}

/// Host that records every call, for replay and inspection.
#[derive(Debug, Default)]
pub struct RecordingHost {
    content_id: String,
    calls: RefCell<Vec<HostCall>>,
}

impl RecordingHost {
    pub fn new(content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    pub fn triggered(&self, verb: Verb) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| **call == HostCall::Trigger(verb))
            .count()
    }

    pub fn announcements(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::Read(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl HostServices for RecordingHost {
    fn resize(&self) {
        self.calls.borrow_mut().push(HostCall::Resize);
    }

    fn read(&self, text: &str) {
        self.calls.borrow_mut().push(HostCall::Read(text.to_string()));
    }

    fn trigger_event(&self, verb: Verb) {
        self.calls.borrow_mut().push(HostCall::Trigger(verb));
    }

    fn content_id(&self) -> &str {
        &self.content_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dictionary_has_defaults() {
        let dictionary = Dictionary::default();
        assert_eq!(dictionary.get("l10n.start"), "Start");
        assert_eq!(dictionary.get("a11y.resultsTitle"), "Here are your results.");
    }

    #[test]
    fn dictionary_fill_overrides_non_empty_values() {
        let mut dictionary = Dictionary::default();
        dictionary.fill([("l10n.start", "Los"), ("l10n.done", "  ")]);
        assert_eq!(dictionary.get("l10n.start"), "Los");
        assert_eq!(dictionary.get("l10n.done"), "Proceed");
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        assert_eq!(Dictionary::default().get("l10n.unknown"), "l10n.unknown");
    }

    #[test]
    fn recording_host_keeps_call_order() {
        let host = RecordingHost::new("42");
        host.read("hello");
        host.trigger_event(Verb::Completed);
        host.resize();

        assert_eq!(
            host.calls(),
            vec![
                HostCall::Read("hello".into()),
                HostCall::Trigger(Verb::Completed),
                HostCall::Resize
            ]
        );
        assert_eq!(host.triggered(Verb::Completed), 1);
        assert_eq!(host.content_id(), "42");
    }
}
