//! Parse uploaded delimited text into a typed [`Dataset`].
//!
//! Missing markers follow the pandas defaults so uploads prepared for the
//! notebook tooling behave the same here.

use std::collections::HashSet;

use tracing::info;

use crate::common::error::{LensError, LensResult};

use super::domain::{Cell, Column, ColumnKind, Dataset, DatasetStore, SessionId};

const NA_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A",
    "#N/A N/A", "#NA", "<NA>", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

fn is_na(raw: &str) -> bool {
    NA_MARKERS.contains(&raw)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Rename repeated header names to `name.1`, `name.2`, ... in order.
fn dedupe_headers(raw: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut out = Vec::with_capacity(raw.len());
    for name in raw {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while taken.contains(&candidate) {
            candidate = format!("{name}.{suffix}");
            suffix += 1;
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

fn build_column(name: String, raw: Vec<String>) -> Column {
    let numeric = raw.iter().all(|v| is_na(v) || parse_number(v).is_some());
    if numeric {
        let cells = raw
            .iter()
            .map(|v| parse_number(v).map_or(Cell::Missing, Cell::Numeric))
            .collect();
        Column::new(name, ColumnKind::Numeric, cells)
    } else {
        let cells = raw
            .into_iter()
            .map(|v| if is_na(&v) { Cell::Missing } else { Cell::Text(v) })
            .collect();
        Column::new(name, ColumnKind::Text, cells)
    }
}

/// Parse a CSV payload with a header row.
pub fn parse_csv(bytes: &[u8]) -> LensResult<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            if idx == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();
    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(LensError::malformed("missing header row"));
    }
    let headers = dedupe_headers(headers);

    let mut raw_columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (column, field) in raw_columns.iter_mut().zip(record.iter()) {
            column.push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw_columns)
        .map(|(name, raw)| build_column(name, raw))
        .collect();
    Dataset::new(columns)
}

/// Parse `bytes` and replace the session's dataset, returning its column names.
pub fn ingest(
    store: &dyn DatasetStore,
    session: &SessionId,
    bytes: &[u8],
) -> LensResult<Vec<String>> {
    let dataset = parse_csv(bytes)?;
    let columns = dataset.column_names();
    let rows = dataset.row_count();
    let snapshot = store.put(session, dataset)?;
    info!(
        session = %session,
        version = snapshot.version,
        rows,
        columns = columns.len(),
        "dataset ingested"
    );
    Ok(columns)
}
