//! Drop rows holding missing values.

use serde::Serialize;
use tracing::info;

use crate::common::error::LensResult;

use super::domain::{Dataset, DatasetStore, SessionId};

/// Row counts on either side of a clean.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CleanReport {
    pub rows_before: usize,
    pub rows_after: usize,
}

/// Rows where every column holds a value.
pub fn drop_missing(dataset: &Dataset) -> Dataset {
    dataset.filter_rows(|row| dataset.row_is_complete(row))
}

/// Replace the session's dataset with its complete rows.
pub fn clean(store: &dyn DatasetStore, session: &SessionId) -> LensResult<CleanReport> {
    let transition = store.transform(session, &mut |ds| Ok(drop_missing(ds)))?;
    let report = CleanReport {
        rows_before: transition.before.dataset.row_count(),
        rows_after: transition.after.dataset.row_count(),
    };
    info!(
        session = %session,
        version = transition.after.version,
        rows_before = report.rows_before,
        rows_after = report.rows_after,
        "dataset cleaned"
    );
    Ok(report)
}
