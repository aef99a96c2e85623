//! Session snapshots persisted as JSON, one file per content id.
//!
//! Files live in `<data_dir>/sessions/<content-id>.json`. Reads are lenient:
//! a missing or damaged file restores as an empty session.

use std::path::PathBuf;

use super::data_dir;
use crate::error::CoreError;
use crate::session::SessionSnapshot;

#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Store under the application data directory.
    pub fn open() -> Result<Self, CoreError> {
        Self::at(data_dir()?.join("sessions"))
    }

    /// Store in an explicit directory, created if needed.
    pub fn at(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, content_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(content_id)))
    }

    /// Stored snapshot, `None` if nothing was saved for this content.
    pub fn load(&self, content_id: &str) -> Option<SessionSnapshot> {
        let json = std::fs::read_to_string(self.path_for(content_id)).ok()?;
        Some(SessionSnapshot::from_json_lenient(&json))
    }

    pub fn save(&self, content_id: &str, snapshot: &SessionSnapshot) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(self.path_for(content_id), json)?;
        tracing::debug!(content_id, "session saved");
        Ok(())
    }

    /// Remove a stored snapshot. Returns whether one existed.
    pub fn clear(&self, content_id: &str) -> Result<bool, CoreError> {
        match std::fs::remove_file(self.path_for(content_id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// File-name-safe form of a content id. Anything outside `[A-Za-z0-9_-]`
/// becomes `_`.
pub fn file_stem(content_id: &str) -> String {
    content_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AnswerRecord;

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("sessions")).unwrap();
        let snapshot = SessionSnapshot {
            panel_index: Some(1),
            answers_given: vec![AnswerRecord { question: 0, options: vec![0] }],
            panels_completed: vec![false, false],
            results: None,
        };

        assert!(store.load("hiking quiz").is_none());
        store.save("hiking quiz", &snapshot).unwrap();
        assert_eq!(store.load("hiking quiz"), Some(snapshot));

        assert!(store.clear("hiking quiz").unwrap());
        assert!(!store.clear("hiking quiz").unwrap());
        assert!(store.load("hiking quiz").is_none());
    }

    #[test]
    fn content_id_cannot_escape_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path()).unwrap();
        store.save("../outside", &SessionSnapshot::default()).unwrap();
        assert!(dir.path().join("___outside.json").exists());
    }

    #[test]
    fn file_stem_replaces_unsafe_characters() {
        assert_eq!(file_stem("hiking-quiz_2"), "hiking-quiz_2");
        assert_eq!(file_stem("a/b c.d"), "a_b_c_d");
    }

    #[test]
    fn damaged_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path()).unwrap();
        std::fs::write(dir.path().join("quiz.json"), "{ broken").unwrap();
        assert_eq!(store.load("quiz"), Some(SessionSnapshot::default()));
    }
}
