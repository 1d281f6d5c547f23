//! Turn a dataset into a dense feature matrix and target vector.
//!
//! Numeric feature columns pass through; every text column expands into one
//! 0/1 indicator per distinct value. The layout depends on the values present,
//! so a matrix is only meaningful for the dataset it was built from.

use std::collections::BTreeSet;

use ndarray::{Array1, Array2};

use crate::common::error::{LensError, LensResult};
use crate::data::domain::{Cell, Column, ColumnKind, Dataset};

/// Encoded features for every row of a dataset.
#[derive(Clone, Debug)]
pub struct FeatureMatrix {
    pub names: Vec<String>,
    pub values: Array2<f64>,
}

impl FeatureMatrix {
    pub fn num_features(&self) -> usize {
        self.names.len()
    }

    pub fn num_rows(&self) -> usize {
        self.values.nrows()
    }
}

/// Look up the target column, which must exist and be numeric.
pub fn target_column<'a>(dataset: &'a Dataset, target: &str) -> LensResult<&'a Column> {
    let column = dataset
        .column(target)
        .ok_or_else(|| LensError::invalid_target(format!("column '{target}' does not exist")))?;
    if column.kind != ColumnKind::Numeric {
        return Err(LensError::invalid_target(format!(
            "column '{target}' is not numeric"
        )));
    }
    Ok(column)
}

fn dense_numeric(column: &Column) -> LensResult<Vec<f64>> {
    column
        .cells
        .iter()
        .map(|cell| {
            cell.as_f64().ok_or_else(|| {
                LensError::insufficient(format!(
                    "column '{}' has missing values; clean the dataset first",
                    column.name
                ))
            })
        })
        .collect()
}

/// Target values, which must all be present.
pub fn target_values(column: &Column) -> LensResult<Array1<f64>> {
    dense_numeric(column).map(Array1::from)
}

/// One-hot encode every column except `target`.
pub fn encode_features(dataset: &Dataset, target: &str) -> LensResult<FeatureMatrix> {
    let rows = dataset.row_count();
    let features: Vec<&Column> = dataset
        .columns()
        .iter()
        .filter(|c| c.name != target)
        .collect();

    let mut names = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();

    for column in features.iter().filter(|c| c.kind == ColumnKind::Numeric) {
        names.push(column.name.clone());
        columns.push(dense_numeric(column)?);
    }

    for column in features.iter().filter(|c| c.kind == ColumnKind::Text) {
        let categories: BTreeSet<&str> = column.text_values().collect();
        for category in categories {
            names.push(format!("{}_{}", column.name, category));
            columns.push(
                column
                    .cells
                    .iter()
                    .map(|cell| match cell {
                        Cell::Text(v) if v == category => 1.0,
                        _ => 0.0,
                    })
                    .collect(),
            );
        }
    }

    let mut values = Array2::zeros((rows, columns.len()));
    for (j, column) in columns.into_iter().enumerate() {
        values.column_mut(j).assign(&Array1::from(column));
    }

    Ok(FeatureMatrix { names, values })
}
