//! Contracts for the external speech and analysis-assistant services.
//!
//! The core never depends on these; the boundary wires them in when present.

/// Failure reported by an external collaborator.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("Could not understand")]
    NotUnderstood,

    #[error("rate limited")]
    RateLimited,

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("response contained no text")]
    Empty,
}

impl CollaboratorError {
    /// Whether trying again later can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CollaboratorError::RateLimited
                | CollaboratorError::Unavailable(_)
                | CollaboratorError::Empty
        )
    }
}

/// Speech-to-text service.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, audio: &[u8]) -> Result<String, CollaboratorError>;
}

/// Free-text completion service used for dataset insights.
pub trait AnalysisAssistant: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, CollaboratorError>;
}
