//! # Profilequiz Core Library
//!
//! Core logic of an interactive personality quiz: a learner answers a series
//! of multiple-choice questions, every answer adds weighted scores to a set
//! of personalities, and the best-matching personality is revealed at the
//! end. Rendering is left to the host; the CLI in this workspace is one such
//! host.
//!
//! ## Architecture
//!
//! - **Content**: authored personalities and questions, sanitized once
//! - **Scoring**: the score matrix built from weight strings and the outcome
//!   resolver with a seedable tie-break
//! - **Quiz**: navigation over panels in classic or chat appearance, driven
//!   by the caller; a deferred completion is fired through `tick()`
//! - **Storage**: TOML configuration and JSON session snapshots
//! - **Export**: Markdown document of the result, written asynchronously
//!
//! ## Key Components
//!
//! - [`Quiz`]: what a host embeds
//! - [`ScoreMatrix`] / [`OutcomeResolver`]: scoring
//! - [`SessionSnapshot`]: persisted session state
//! - [`QuizConfig`]: quiz configuration

pub mod content;
pub mod error;
pub mod events;
pub mod export;
pub mod quiz;
pub mod scoring;
pub mod services;
pub mod session;
pub mod storage;

pub use content::{AnswerOption, Image, Personality, Question, QuizContent, Visualization};
pub use error::{ConfigError, ContentError, CoreError, ExportError, QuizSetupError};
pub use events::QuizEvent;
pub use export::{AbortSignal, DocumentExporter, ExportContent, ExportElement};
pub use quiz::{Appearance, Quiz, ResetOptions, Screen};
pub use scoring::{Outcome, OutcomeResolver, ScoreMatrix};
pub use services::{Dictionary, HostServices, Localizer, NoopHost, RecordingHost, Verb};
pub use session::{AnswerRecord, SessionSnapshot};
pub use storage::{QuizConfig, ResultAnimation, SessionStore};
