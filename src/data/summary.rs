//! Per-column descriptive statistics.
//!
//! Numeric columns report count, mean, sample standard deviation, min,
//! quartiles and max over present values. Text columns report count, number
//! of distinct values, and the most frequent value with its frequency.
//! Statistics that are undefined for a column are omitted, never `NaN`.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::info;

use crate::common::error::LensResult;

use super::domain::{Column, ColumnKind, Dataset, DatasetStore, SessionId};

/// Statistics for a numeric column.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct NumericStats {
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(rename = "25%", skip_serializing_if = "Option::is_none")]
    pub p25: Option<f64>,
    #[serde(rename = "50%", skip_serializing_if = "Option::is_none")]
    pub p50: Option<f64>,
    #[serde(rename = "75%", skip_serializing_if = "Option::is_none")]
    pub p75: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Statistics for a text column.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct CategoricalStats {
    pub count: u64,
    pub unique: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freq: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum ColumnStatistics {
    Numeric(NumericStats),
    Categorical(CategoricalStats),
}

/// Column statistics in dataset column order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summary {
    columns: Vec<(String, ColumnStatistics)>,
}

impl Summary {
    pub fn get(&self, column: &str) -> Option<&ColumnStatistics> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, stats)| stats)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for Summary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, stats) in &self.columns {
            map.serialize_entry(name, stats)?;
        }
        map.end()
    }
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let (a, b) = (sorted[lo], sorted[hi]);
    let frac = pos - lo as f64;
    let span = b - a;
    if span.is_finite() {
        a + span * frac
    } else {
        a * (1.0 - frac) + b * frac
    }
}

fn numeric_stats(column: &Column) -> NumericStats {
    let mut values: Vec<f64> = column.numeric_values().collect();
    let n = values.len();
    if n == 0 {
        return NumericStats::default();
    }
    values.sort_by(f64::total_cmp);

    let mean = running_mean(&values);
    let std = (n > 1).then(|| sample_std(&values, mean)).flatten();

    NumericStats {
        count: n as u64,
        mean: finite(mean),
        std,
        min: finite(values[0]),
        p25: finite(quantile(&values, 0.25)),
        p50: finite(quantile(&values, 0.5)),
        p75: finite(quantile(&values, 0.75)),
        max: finite(values[n - 1]),
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Incremental mean; stays finite for values near `f64::MAX`.
fn running_mean(values: &[f64]) -> f64 {
    values
        .iter()
        .enumerate()
        .fold(0.0, |mean, (i, v)| mean + (v - mean) / (i + 1) as f64)
}

/// Sample standard deviation over deviations scaled by the largest one.
fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    let scale = values.iter().fold(0.0_f64, |acc, v| acc.max((v - mean).abs()));
    if !scale.is_finite() {
        return None;
    }
    if scale == 0.0 {
        return Some(0.0);
    }
    let ss: f64 = values.iter().map(|v| ((v - mean) / scale).powi(2)).sum();
    finite(scale * (ss / (values.len() - 1) as f64).sqrt())
}

fn categorical_stats(column: &Column) -> CategoricalStats {
    // value -> (frequency, first row seen)
    let mut counts: HashMap<&str, (u64, usize)> = HashMap::new();
    let mut count = 0u64;
    for (idx, value) in column.text_values().enumerate() {
        count += 1;
        counts.entry(value).or_insert((0, idx)).0 += 1;
    }

    let top = counts
        .iter()
        .max_by(|(_, (fa, ia)), (_, (fb, ib))| fa.cmp(fb).then(ib.cmp(ia)))
        .map(|(value, (freq, _))| (value.to_string(), *freq));

    CategoricalStats {
        count,
        unique: counts.len() as u64,
        freq: top.as_ref().map(|(_, freq)| *freq),
        top: top.map(|(value, _)| value),
    }
}

/// Describe every column of `dataset`.
pub fn describe(dataset: &Dataset) -> Summary {
    let columns = dataset
        .columns()
        .iter()
        .map(|column| {
            let stats = match column.kind {
                ColumnKind::Numeric => ColumnStatistics::Numeric(numeric_stats(column)),
                ColumnKind::Text => ColumnStatistics::Categorical(categorical_stats(column)),
            };
            (column.name.clone(), stats)
        })
        .collect();
    Summary { columns }
}

/// Summarise the session's current dataset.
pub fn summarize(store: &dyn DatasetStore, session: &SessionId) -> LensResult<Summary> {
    let snapshot = store.get(session)?;
    let summary = describe(&snapshot.dataset);
    info!(
        session = %session,
        version = snapshot.version,
        columns = summary.len(),
        "dataset summarised"
    );
    Ok(summary)
}
