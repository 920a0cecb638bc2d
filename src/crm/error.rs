//! Error types for the CRM record source.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Unknown CRM object type: {0}")]
    UnknownObjectType(String),

    #[error("Missing credential: {0} is not set")]
    MissingCredential(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Could not decode CRM response: {0}")]
    Decode(String),
}

impl SourceError {
    /// Upstream failures degrade to partial results; the rest fail fast
    pub fn is_upstream(&self) -> bool {
        matches!(self, SourceError::Transport(_) | SourceError::Decode(_))
    }
}
