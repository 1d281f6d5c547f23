//! Core dataset definitions and contracts.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::common::error::{LensError, LensResult};

/// Identifier for a client session.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        SessionId::new(value)
    }
}

/// A single cell value.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Numeric(f64),
    Text(String),
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Column kind, fixed at ingestion.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ColumnKind {
    Numeric,
    Text,
}

/// A named column of cells sharing one kind.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            kind,
            cells,
        }
    }

    /// Present numeric values, in row order.
    pub fn numeric_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells.iter().filter_map(Cell::as_f64)
    }

    /// Present text values, in row order.
    pub fn text_values(&self) -> impl Iterator<Item = &str> + '_ {
        self.cells.iter().filter_map(Cell::as_text)
    }

    pub fn present_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_missing()).count()
    }
}

/// Ordered, equal-length, uniquely named columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Build a dataset, enforcing equal column lengths and unique names.
    pub fn new(columns: Vec<Column>) -> LensResult<Self> {
        let rows = columns.first().map_or(0, |c| c.cells.len());
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if column.cells.len() != rows {
                return Err(LensError::malformed(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name,
                    column.cells.len(),
                    rows
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(LensError::malformed(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when every column holds a value at `row`.
    pub fn row_is_complete(&self, row: usize) -> bool {
        self.columns.iter().all(|c| !c.cells[row].is_missing())
    }

    /// New dataset holding only the rows for which `keep` is true.
    pub fn filter_rows<F>(&self, keep: F) -> Dataset
    where
        F: Fn(usize) -> bool,
    {
        let kept: Vec<usize> = (0..self.rows).filter(|&r| keep(r)).collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                kind: c.kind,
                cells: kept.iter().map(|&r| c.cells[r].clone()).collect(),
            })
            .collect();
        Dataset {
            columns,
            rows: kept.len(),
        }
    }
}

/// An immutable, published dataset version.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub version: u64,
    pub dataset: Arc<Dataset>,
}

/// Snapshots on either side of an in-place transform.
#[derive(Clone, Debug)]
pub struct Transition {
    pub before: Snapshot,
    pub after: Snapshot,
}

/// Session-keyed dataset storage.
pub trait DatasetStore: Send + Sync {
    /// Replace whatever the session holds.
    fn put(&self, session: &SessionId, dataset: Dataset) -> LensResult<Snapshot>;

    /// Current snapshot, or `NotFound`.
    fn get(&self, session: &SessionId) -> LensResult<Snapshot>;

    /// Derive a new dataset from the current one and publish it atomically.
    fn transform(
        &self,
        session: &SessionId,
        f: &mut dyn FnMut(&Dataset) -> LensResult<Dataset>,
    ) -> LensResult<Transition>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(name: &str, values: &[Option<f64>]) -> Column {
        let cells = values
            .iter()
            .map(|v| v.map_or(Cell::Missing, Cell::Numeric))
            .collect();
        Column::new(name, ColumnKind::Numeric, cells)
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = Dataset::new(vec![num("a", &[Some(1.0)]), num("b", &[])]).unwrap_err();
        assert!(matches!(err, LensError::MalformedInput(_)));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Dataset::new(vec![num("a", &[Some(1.0)]), num("a", &[Some(2.0)])]).unwrap_err();
        assert!(matches!(err, LensError::MalformedInput(_)));
    }

    #[test]
    fn filter_rows_keeps_order_and_kinds() {
        let ds = Dataset::new(vec![
            num("a", &[Some(1.0), None, Some(3.0)]),
            num("b", &[Some(4.0), Some(5.0), Some(6.0)]),
        ])
        .unwrap();

        let kept = ds.filter_rows(|r| ds.row_is_complete(r));
        assert_eq!(kept.row_count(), 2);
        assert_eq!(kept.column_names(), vec!["a", "b"]);
        assert_eq!(kept.columns()[0].cells, vec![Cell::Numeric(1.0), Cell::Numeric(3.0)]);
        assert_eq!(kept.columns()[1].kind, ColumnKind::Numeric);
    }

    #[test]
    fn empty_dataset_has_zero_rows() {
        let ds = Dataset::new(Vec::new()).unwrap();
        assert_eq!(ds.row_count(), 0);
        assert_eq!(ds.column_count(), 0);
    }
}
