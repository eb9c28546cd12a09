//! The single prediction entry point shared by every front end.

use std::fmt;
use std::sync::Arc;

use housing_core::{
    HousingRecord, PredictError, Predictor, RecordTable, Transformer, PREDICTION_COLUMN,
};
use tracing::debug;

/// Transform-then-predict over a loaded artifact pair.
///
/// Cloning is cheap; both artifacts are shared and never mutated.
#[derive(Clone)]
pub struct InferenceFacade {
    pipeline: Arc<dyn Transformer>,
    model: Arc<dyn Predictor>,
}

impl fmt::Debug for InferenceFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceFacade").finish_non_exhaustive()
    }
}

impl InferenceFacade {
    pub fn new(pipeline: Arc<dyn Transformer>, model: Arc<dyn Predictor>) -> Self {
        Self { pipeline, model }
    }

    /// Fails with `MissingColumns` when any required column is absent.
    pub fn require_columns(&self, table: &RecordTable) -> Result<(), PredictError> {
        let missing = table.missing_columns();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PredictError::MissingColumns(missing))
        }
    }

    /// Predicts one value per row, in row order. The whole table is one batch.
    pub fn predict(&self, table: &RecordTable) -> Result<Vec<f64>, PredictError> {
        let features = self.pipeline.transform(table)?;
        let predictions = self.model.predict(&features)?;

        if predictions.len() != table.len() {
            return Err(PredictError::TransformOrPredictFailure(format!(
                "model returned {} predictions for {} records",
                predictions.len(),
                table.len()
            )));
        }

        debug!(rows = table.len(), features = features.cols(), "Predicted batch");
        Ok(predictions)
    }

    pub fn predict_record(&self, record: &HousingRecord) -> Result<f64, PredictError> {
        let table = RecordTable::from_records(std::slice::from_ref(record));
        let predictions = self.predict(&table)?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| PredictError::TransformOrPredictFailure("model returned no prediction".into()))
    }

    /// Returns the input table with the prediction column appended.
    pub fn predict_table(&self, table: &RecordTable) -> Result<(RecordTable, Vec<f64>), PredictError> {
        let predictions = self.predict(table)?;
        let augmented = table
            .with_column(PREDICTION_COLUMN, &predictions)
            .map_err(PredictError::TransformOrPredictFailure)?;
        Ok((augmented, predictions))
    }
}
