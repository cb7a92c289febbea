//! Error types for the editor

use crate::conditions::ConditionGroup;
use thiserror::Error;

/// Failure reported by the remote mutation collaborator.
///
/// The message is detail for diagnostics; users only ever see the configured
/// toast text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteError {
    message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("Invalid {group} condition: {id}")]
    InvalidCondition { group: ConditionGroup, id: String },

    #[error("Index {index} out of range for list of length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("Duplicate tree path: {0}")]
    DuplicateTreePath(String),

    #[error("A mutation is already in flight")]
    ConcurrentMutation,

    #[error("No mutation in flight with id {0}")]
    UnknownMutation(u64),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<pageforge_common::CommonError> for EditorError {
    fn from(e: pageforge_common::CommonError) -> Self {
        EditorError::Config(e.to_string())
    }
}
