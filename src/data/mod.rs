//! Data domain: ingestion, storage, cleaning and summaries of session datasets.

pub mod clean;
pub mod domain;
pub mod ingest;
pub mod store;
pub mod summary;

pub use clean::CleanReport;
pub use domain::{Cell, Column, ColumnKind, Dataset, DatasetStore, SessionId, Snapshot};
pub use store::MemoryStore;
pub use summary::Summary;
