//! Hand-off to the external speech and analysis-assistant services.

pub mod domain;
pub mod prompt;
pub mod service;

pub use domain::{AnalysisAssistant, CollaboratorError, Transcriber};
pub use service::RetryPolicy;
