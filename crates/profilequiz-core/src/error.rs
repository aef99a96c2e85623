//! Core error types for profilequiz-core.
//!
//! Authored content never produces an error here: unknown personality names,
//! malformed weights and damaged session state are absorbed with safe
//! defaults. What remains are I/O, configuration and export failures, plus the
//! two setup conditions that turn the quiz into a message screen.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for profilequiz-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Content file errors
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be created
    #[error("Data directory unavailable: {0}")]
    DataDirUnavailable(String),
}

/// Errors while reading quiz content.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Failed to read content from {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse content: {0}")]
    ParseFailed(#[from] serde_json::Error),
}

/// Conditions that keep the quiz from being interactive.
///
/// The quiz still constructs; it shows the localized hint for the error
/// instead of any question.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizSetupError {
    #[error("no valid personalities configured")]
    NoPersonalities,

    #[error("no valid questions configured")]
    NoQuestions,
}

impl QuizSetupError {
    /// Dictionary key of the hint shown in place of the quiz.
    pub fn l10n_key(&self) -> &'static str {
        match self {
            QuizSetupError::NoPersonalities => "l10n.noPersonalities",
            QuizSetupError::NoQuestions => "l10n.noQuestions",
        }
    }
}

/// Export errors. None of them affect quiz state.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The abort signal was raised before any output was written
    #[error("Export aborted")]
    Aborted,

    /// There is no finalized result to export
    #[error("Nothing to export: the quiz has no result yet")]
    NoResult,

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
