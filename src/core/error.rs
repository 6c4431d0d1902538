// Centralized error handling for the client core

use thiserror::Error;

/// Local input errors. These never reach the network layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Skill name must not be empty")]
    EmptySkillName,

    #[error("Add at least one skill before saving")]
    NoSkills,

    #[error("Unknown question: {0}")]
    UnknownQuestion(u32),

    #[error("Option {option} is out of range for question {question_id} ({options} options)")]
    OptionOutOfRange {
        question_id: u32,
        option: usize,
        options: usize,
    },
}

/// Errors produced by a remote call against the backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request rejected ({status}): {reason}")]
    RemoteRejection { status: u16, reason: String },

    #[error("Session expired, please sign in again")]
    SessionExpired,
}

impl ClientError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

/// Errors surfaced by skill-set mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkillError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to update skills: {0}")]
    UpdateFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Session expired, please sign in again")]
    SessionExpired,
}

impl From<ClientError> for SkillError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Network(msg) => SkillError::Network(msg),
            ClientError::RemoteRejection { reason, .. } => SkillError::UpdateFailed(reason),
            ClientError::SessionExpired => SkillError::SessionExpired,
        }
    }
}

/// Errors surfaced by the assessment state machine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssessmentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Cannot {operation} while assessment is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Answer every question before submitting ({answered}/{total} answered)")]
    Incomplete { answered: usize, total: usize },

    #[error("Questions for {0} are not ready yet")]
    NotReady(String),

    #[error("A newer assessment replaced this one")]
    Superseded,

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl AssessmentError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, AssessmentError::Client(ClientError::SessionExpired))
    }
}
