//! Error types for the editor

use crate::session::SaveSkipped;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Suggestion error: {0}")]
    Suggestion(#[from] SuggestionError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Save skipped: {0}")]
    Skipped(#[from] SaveSkipped),

    #[error("Session is closed")]
    SessionClosed,
}

/// Any failed write. The session treats every variant as transient.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Invalid document id: {0:?}")]
    InvalidId(String),

    #[error("Write rejected: {0}")]
    Rejected(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SuggestionError {
    #[error("Unknown section: {0}")]
    UnknownSection(String),

    #[error("Section {section} does not accept target {target}")]
    InvalidTarget { section: String, target: String },

    #[error("Invalid value for {section}: {message}")]
    InvalidValue { section: String, message: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
