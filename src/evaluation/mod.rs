//! Evaluation: held-out scoring of the baseline regression model.

pub mod domain;
pub mod metrics;
pub mod service;

pub use domain::EvaluationResult;
