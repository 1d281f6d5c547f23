//! Regression metrics.

use ndarray::ArrayView1;

/// Coefficient of determination: `1 - SS_res / SS_tot`.
///
/// When the true values are constant (`SS_tot == 0`) the score is `1.0` for a
/// perfect prediction and `0.0` otherwise.
pub fn r2_score(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> f64 {
    debug_assert_eq!(y_true.len(), y_pred.len());

    let Some(mean) = y_true.mean() else {
        return 0.0;
    };
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Round half away from zero to `decimals` places.
///
/// Exact binary ties round up in magnitude (`0.125` → `0.13`), unlike
/// banker's rounding.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
