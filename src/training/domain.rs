//! Domain types for fitting the baseline regression model.

use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::common::config::AppCfg;
use crate::common::error::LensResult;

/// Ordinary linear model: `y = X · coefficients + intercept`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearModel {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
}

impl LinearModel {
    pub fn num_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Predict one value per row of `x`.
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Array1<f64> {
        x.dot(&self.coefficients) + self.intercept
    }

    pub fn is_finite(&self) -> bool {
        self.intercept.is_finite() && self.coefficients.iter().all(|c| c.is_finite())
    }
}

/// How rows are divided between fitting and scoring.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SplitConfig {
    /// Fraction of rows held out, in (0, 1).
    pub test_fraction: f64,
    /// Seed for the row shuffle.
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

impl From<&AppCfg> for SplitConfig {
    fn from(cfg: &AppCfg) -> Self {
        Self {
            test_fraction: cfg.test_fraction,
            seed: cfg.split_seed,
        }
    }
}

/// Interface for components that can fit a model to a feature matrix.
pub trait Trainer {
    fn fit(&self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> LensResult<LinearModel>;
}

#[cfg(test)]
mod tests {
    use ndarray::{array, Array1};

    use super::*;

    #[test]
    fn predict_applies_weights_and_intercept() {
        let model = LinearModel {
            coefficients: array![2.0, -1.0],
            intercept: 0.5,
        };
        let x = array![[1.0, 1.0], [0.0, 3.0]];
        assert_eq!(model.predict(x.view()), array![1.5, -2.5]);
    }

    #[test]
    fn non_finite_weights_are_detected() {
        let model = LinearModel {
            coefficients: Array1::from(vec![f64::NAN]),
            intercept: 0.0,
        };
        assert!(!model.is_finite());
    }
}
