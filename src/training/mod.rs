//! Training domain: feature encoding, row splitting and model fitting.

pub mod domain;
pub mod encode;
pub mod lstsq;
pub mod split;

pub use domain::{LinearModel, SplitConfig, Trainer};
pub use encode::FeatureMatrix;
pub use lstsq::LeastSquares;
pub use split::Partition;
