//! Ordinary least squares with intercept.
//!
//! The intercept is handled by centring features and target. The centred
//! system is solved with Householder QR and column pivoting; columns whose
//! remaining norm falls below the rank tolerance get a zero coefficient, which
//! keeps collinear one-hot indicators from blowing up the solve.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::common::error::{LensError, LensResult};

use super::domain::{LinearModel, Trainer};

/// Least-squares trainer.
#[derive(Copy, Clone, Debug, Default)]
pub struct LeastSquares;

impl Trainer for LeastSquares {
    fn fit(&self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> LensResult<LinearModel> {
        if x.nrows() != y.len() {
            return Err(LensError::internal(format!(
                "feature rows ({}) and target length ({}) differ",
                x.nrows(),
                y.len()
            )));
        }
        let (x_mean, y_mean) = match (x.mean_axis(Axis(0)), y.mean()) {
            (Some(xm), Some(ym)) => (xm, ym),
            _ => return Err(LensError::insufficient("no rows to fit")),
        };

        let centred_x = &x - &x_mean;
        let centred_y = &y - y_mean;
        let coefficients = solve_pivoted_qr(centred_x, centred_y);
        let intercept = y_mean - x_mean.dot(&coefficients);

        let model = LinearModel {
            coefficients,
            intercept,
        };
        if !model.is_finite() {
            return Err(LensError::internal("least squares produced non-finite weights"));
        }
        Ok(model)
    }
}

/// Relative residual norm below which a column counts as linearly dependent.
const RANK_TOLERANCE: f64 = 1e-10;

/// Minimise `|a·z - b|` for `z`, zeroing rank-deficient directions.
fn solve_pivoted_qr(mut a: Array2<f64>, mut b: Array1<f64>) -> Array1<f64> {
    let (n, p) = a.dim();
    let mut perm: Vec<usize> = (0..p).collect();
    let mut scale: Vec<f64> = a.columns().into_iter().map(|c| c.dot(&c).sqrt()).collect();

    let mut rank = 0;
    for k in 0..n.min(p) {
        // Largest remaining column that is not (numerically) spanned already.
        let candidate = (k..p)
            .filter_map(|j| {
                let tail = a.slice(s![k.., j]);
                let norm = tail.dot(&tail).sqrt();
                (norm > RANK_TOLERANCE * scale[j]).then_some((j, norm))
            })
            .fold(None, |best: Option<(usize, f64)>, cur| match best {
                Some(top) if top.1 >= cur.1 => Some(top),
                _ => Some(cur),
            });
        let Some((pivot, norm)) = candidate else {
            break;
        };
        if pivot != k {
            for i in 0..n {
                a.swap((i, k), (i, pivot));
            }
            perm.swap(k, pivot);
            scale.swap(k, pivot);
        }

        // Householder reflector mapping a[k.., k] onto alpha * e_k.
        let alpha = if a[[k, k]] > 0.0 { -norm } else { norm };
        let mut v = a.slice(s![k.., k]).to_owned();
        v[0] -= alpha;
        let v_norm2 = v.dot(&v);
        if v_norm2 > 0.0 {
            for j in k..p {
                let mut col = a.slice_mut(s![k.., j]);
                let f = 2.0 * v.dot(&col) / v_norm2;
                col.scaled_add(-f, &v);
            }
            let mut rhs = b.slice_mut(s![k..]);
            let f = 2.0 * v.dot(&rhs) / v_norm2;
            rhs.scaled_add(-f, &v);
        }
        rank += 1;
    }

    let mut z = vec![0.0; rank];
    for i in (0..rank).rev() {
        let tail: f64 = (i + 1..rank).map(|j| a[[i, j]] * z[j]).sum();
        z[i] = (b[i] - tail) / a[[i, i]];
    }

    let mut coefficients = Array1::zeros(p);
    for (i, &column) in perm.iter().take(rank).enumerate() {
        coefficients[column] = z[i];
    }
    coefficients
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    use super::*;

    #[test]
    fn recovers_exact_linear_relation() {
        let x = array![[1.0, 2.0], [2.0, 1.0], [3.0, 5.0], [4.0, 3.0], [5.0, 0.0]];
        let y = x.column(0).mapv(|v| 3.0 * v) - x.column(1).mapv(|v| 2.0 * v) + 1.0;

        let model = LeastSquares.fit(x.view(), y.view()).unwrap();
        assert_abs_diff_eq!(model.coefficients[0], 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(model.coefficients[1], -2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(model.intercept, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn matches_closed_form_simple_regression() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![2.0, 4.1, 5.9, 8.2];
        let model = LeastSquares.fit(x.view(), y.view()).unwrap();
        // slope = cov(x, y) / var(x) = 2.04, intercept = mean(y) - slope * mean(x)
        assert_abs_diff_eq!(model.coefficients[0], 2.04, epsilon = 1e-9);
        assert_abs_diff_eq!(model.intercept, 5.05 - 2.04 * 2.5, epsilon = 1e-9);
    }

    #[test]
    fn collinear_indicators_stay_finite() {
        // two one-hot columns always sum to one
        let x = array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [0.0, 1.0]];
        let y = array![10.0, 20.0, 12.0, 22.0];
        let model = LeastSquares.fit(x.view(), y.view()).unwrap();

        let predictions = model.predict(x.view());
        assert_abs_diff_eq!(predictions[0], 11.0, epsilon = 1e-9);
        assert_abs_diff_eq!(predictions[1], 21.0, epsilon = 1e-9);
    }

    #[test]
    fn constant_features_predict_the_mean() {
        let x = Array2::from_elem((3, 2), 4.0);
        let y = array![1.0, 2.0, 6.0];
        let model = LeastSquares.fit(x.view(), y.view()).unwrap();
        assert_eq!(model.coefficients, array![0.0, 0.0]);
        assert_abs_diff_eq!(model.intercept, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn more_features_than_rows() {
        let x = array![[1.0, 0.0, 3.0], [0.0, 1.0, 5.0]];
        let y = array![1.0, 2.0];
        let model = LeastSquares.fit(x.view(), y.view()).unwrap();
        let predictions = model.predict(x.view());
        assert_abs_diff_eq!(predictions[0], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(predictions[1], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_input_is_insufficient() {
        let x = Array2::<f64>::zeros((0, 2));
        let y = Array1::<f64>::zeros(0);
        let err = LeastSquares.fit(x.view(), y.view()).unwrap_err();
        assert!(matches!(err, LensError::InsufficientData(_)));
    }
}
