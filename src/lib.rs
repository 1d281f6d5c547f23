//! Session-scoped tabular dataset pipeline: CSV ingestion, cleaning,
//! descriptive statistics and a baseline regression score.

pub mod api;
pub mod assistant;
pub mod common;
pub mod data;
pub mod evaluation;
pub mod training;

pub use api::{ApiResponse, Engine};
pub use common::config::AppCfg;
pub use common::error::{LensError, LensResult};
pub use data::domain::SessionId;
