//! Domain primitives for model evaluation.

/// Held-out score of the baseline model for one dataset version.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationResult {
    /// R² on the held-out rows, rounded to two decimals. May be negative.
    pub model_score: f64,
    /// Snapshot version the score was computed against.
    pub dataset_version: u64,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Encoded feature count for this dataset version.
    pub features: usize,
}
