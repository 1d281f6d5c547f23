//! Score the baseline regression model against a session's dataset.
//!
//! Every call re-encodes the current snapshot, so the feature layout always
//! matches the data that is stored right now (after a clean, categories that
//! disappeared also disappear from the encoding).

use ndarray::Axis;
use tracing::info;

use crate::common::error::{LensError, LensResult};
use crate::data::domain::{DatasetStore, SessionId};
use crate::training::domain::{SplitConfig, Trainer};
use crate::training::encode::{encode_features, target_column, target_values};
use crate::training::lstsq::LeastSquares;
use crate::training::split::train_test_split;

use super::domain::EvaluationResult;
use super::metrics::{r2_score, round_to};

/// Evaluate with the default least-squares trainer.
pub fn evaluate(
    store: &dyn DatasetStore,
    session: &SessionId,
    target: &str,
    split: &SplitConfig,
) -> LensResult<EvaluationResult> {
    evaluate_with(store, session, target, split, &LeastSquares)
}

/// Fit `trainer` on the training rows and report held-out R².
pub fn evaluate_with(
    store: &dyn DatasetStore,
    session: &SessionId,
    target: &str,
    split: &SplitConfig,
    trainer: &dyn Trainer,
) -> LensResult<EvaluationResult> {
    let snapshot = store.get(session)?;
    let dataset = &snapshot.dataset;

    let target_col = target_column(dataset, target)?;
    if dataset.row_count() < 2 {
        return Err(LensError::insufficient(format!(
            "need at least 2 rows to evaluate, found {}",
            dataset.row_count()
        )));
    }
    let y = target_values(target_col)?;
    let features = encode_features(dataset, target)?;
    if features.num_features() == 0 {
        return Err(LensError::insufficient("no feature columns besides the target"));
    }

    let partition = train_test_split(dataset.row_count(), split)?;
    let x_train = features.values.select(Axis(0), &partition.train);
    let y_train = y.select(Axis(0), &partition.train);
    let x_test = features.values.select(Axis(0), &partition.test);
    let y_test = y.select(Axis(0), &partition.test);

    let model = trainer.fit(x_train.view(), y_train.view())?;
    if model.num_features() != features.num_features() {
        return Err(LensError::internal(format!(
            "trainer returned {} weights for {} features",
            model.num_features(),
            features.num_features()
        )));
    }
    let predictions = model.predict(x_test.view());
    let score = r2_score(y_test.view(), predictions.view());
    if !score.is_finite() {
        return Err(LensError::internal("model score is not finite"));
    }

    let result = EvaluationResult {
        model_score: round_to(score, 2),
        dataset_version: snapshot.version,
        train_rows: partition.train.len(),
        test_rows: partition.test.len(),
        features: features.num_features(),
    };
    info!(
        session = %session,
        version = result.dataset_version,
        target_column = target,
        features = result.features,
        train_rows = result.train_rows,
        test_rows = result.test_rows,
        score = result.model_score,
        "model evaluated"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use ndarray::{ArrayView1, ArrayView2};

    use super::*;
    use crate::data::clean::clean;
    use crate::data::ingest::ingest;
    use crate::data::store::MemoryStore;
    use crate::training::domain::LinearModel;

    /// Counts calls and delegates to least squares.
    #[derive(Default)]
    struct CountingTrainer {
        calls: Cell<usize>,
    }

    impl Trainer for CountingTrainer {
        fn fit(&self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> LensResult<LinearModel> {
            self.calls.set(self.calls.get() + 1);
            LeastSquares.fit(x, y)
        }
    }

    fn linear_csv(rows: usize) -> String {
        let mut csv = String::from("x,noise,y\n");
        for i in 0..rows {
            let x = i as f64;
            let noise = ((i * 7) % 5) as f64;
            csv.push_str(&format!("{x},{noise},{}\n", 2.0 * x + 1.0 + 0.1 * noise));
        }
        csv
    }

    fn store_with(csv: &str) -> (MemoryStore, SessionId) {
        let store = MemoryStore::new();
        let session = SessionId::new("s");
        ingest(&store, &session, csv.as_bytes()).unwrap();
        (store, session)
    }

    #[test]
    fn near_linear_data_scores_close_to_one() {
        let (store, session) = store_with(&linear_csv(30));
        let result = evaluate(&store, &session, "y", &SplitConfig::default()).unwrap();
        assert_eq!(result.model_score, 1.0);
        assert_eq!(result.train_rows, 24);
        assert_eq!(result.test_rows, 6);
        assert_eq!(result.features, 2);
    }

    #[test]
    fn repeated_calls_are_deterministic() {
        let csv = "a,c,y\n1,u,3\n4,v,1\n2,u,8\n7,w,2\n5,v,9\n3,u,4\n9,w,6\n6,v,5\n8,u,7\n0,w,1\n";
        let (store, session) = store_with(csv);
        let split = SplitConfig::default();
        let first = evaluate(&store, &session, "y", &split).unwrap();
        let second = evaluate(&store, &session, "y", &split).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_target_never_fits() {
        let (store, session) = store_with(&linear_csv(10));
        let trainer = CountingTrainer::default();
        let split = SplitConfig::default();
        let err = evaluate_with(&store, &session, "missing", &split, &trainer).unwrap_err();
        assert!(matches!(err, LensError::InvalidTarget(_)));
        assert_eq!(trainer.calls.get(), 0);
    }

    #[test]
    fn text_target_is_invalid() {
        let (store, session) = store_with("name,y\na,1\nb,2\nc,3\n");
        let err = evaluate(&store, &session, "name", &SplitConfig::default()).unwrap_err();
        assert!(matches!(err, LensError::InvalidTarget(_)));
    }

    #[test]
    fn single_row_is_insufficient() {
        let (store, session) = store_with("x,y\n1,2\n");
        let trainer = CountingTrainer::default();
        let split = SplitConfig::default();
        let err = evaluate_with(&store, &session, "y", &split, &trainer).unwrap_err();
        assert!(matches!(err, LensError::InsufficientData(_)));
        assert_eq!(trainer.calls.get(), 0);
    }

    #[test]
    fn target_only_dataset_is_insufficient() {
        let (store, session) = store_with("y\n1\n2\n3\n");
        let err = evaluate(&store, &session, "y", &SplitConfig::default()).unwrap_err();
        assert!(matches!(err, LensError::InsufficientData(_)));
    }

    #[test]
    fn missing_values_must_be_cleaned_first() {
        let (store, session) = store_with("x,y\n1,2\n2,\n3,6\n4,8\n5,10\n6,12\n");
        let err = evaluate(&store, &session, "y", &SplitConfig::default()).unwrap_err();
        assert!(matches!(err, LensError::InsufficientData(_)));

        clean(&store, &session).unwrap();
        assert!(evaluate(&store, &session, "y", &SplitConfig::default()).is_ok());
    }

    #[test]
    fn encoding_follows_the_current_dataset() {
        // category "z" only appears on a row that cleaning removes
        let csv = "c,n,y\nu,1,2\nv,2,4\nz,7,\nu,3,6\nv,4,8\nu,5,10\nv,6,12\n";
        let (store, session) = store_with(csv);
        let before = store.get(&session).unwrap();
        assert_eq!(
            encode_features(&before.dataset, "y").unwrap().names,
            vec!["n", "c_u", "c_v", "c_z"]
        );

        clean(&store, &session).unwrap();
        let result = evaluate(&store, &session, "y", &SplitConfig::default()).unwrap();
        let current = store.get(&session).unwrap();
        assert_eq!(result.dataset_version, current.version);
        assert_eq!(
            encode_features(&current.dataset, "y").unwrap().names,
            vec!["n", "c_u", "c_v"]
        );
        assert_eq!(result.features, 3);
    }

    #[test]
    fn no_dataset_is_not_found() {
        let store = MemoryStore::new();
        let err = evaluate(&store, &"s".into(), "y", &SplitConfig::default()).unwrap_err();
        assert!(matches!(err, LensError::NotFound(_)));
    }
}
