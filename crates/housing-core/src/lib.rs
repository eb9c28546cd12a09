//! Core domain types and error definitions for housing price inference.
//!
//! This crate provides the types shared by every front end:
//!
//! - [`HousingRecord`] and [`OceanProximity`]: the typed input schema
//! - [`RecordTable`] and [`Cell`]: loosely typed tabular input (JSON or CSV)
//! - [`Transformer`] and [`Predictor`]: the two artifact capabilities
//! - [`PredictError`]: errors surfaced to callers of the inference facade
//!
//! # Example
//!
//! ```rust
//! use housing_core::{HousingRecord, RecordTable};
//!
//! let table = RecordTable::from_records(&[HousingRecord::reference()]);
//! assert_eq!(table.len(), 1);
//! assert!(table.missing_columns().is_empty());
//! ```

mod matrix;
mod record;
mod table;

pub use matrix::FeatureMatrix;
pub use record::{HousingRecord, OceanProximity};
pub use table::{Cell, RecordTable};

use thiserror::Error;

/// Columns every scorable record must carry, in schema order.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "longitude",
    "latitude",
    "housing_median_age",
    "total_rooms",
    "total_bedrooms",
    "population",
    "households",
    "median_income",
    "ocean_proximity",
];

/// Name of the column appended to tabular output.
pub const PREDICTION_COLUMN: &str = "predicted_median_house_value";

pub const INVALID_REQUEST_FORMAT: &str =
    "Invalid request format. Expected 'data' field with list of records";

/// Errors surfaced by the inference facade.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    /// One or both artifacts could not be loaded.
    #[error("Model not loaded: {0}")]
    ArtifactsNotLoaded(String),

    /// Required columns are absent from the input table.
    #[error("Missing required columns: {0:?}")]
    MissingColumns(Vec<String>),

    /// The request body did not have the expected shape.
    #[error("{0}")]
    MalformedRequest(String),

    /// The transform or predict step failed. Message is the artifact's own.
    #[error("{0}")]
    TransformOrPredictFailure(String),
}

impl From<ArtifactError> for PredictError {
    fn from(err: ArtifactError) -> Self {
        PredictError::TransformOrPredictFailure(err.to_string())
    }
}

/// Failure raised by an artifact while transforming or predicting.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct ArtifactError(pub String);

impl ArtifactError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Maps a raw record table to the encoded numeric representation a model expects.
pub trait Transformer: Send + Sync {
    fn transform(&self, table: &RecordTable) -> Result<FeatureMatrix, ArtifactError>;
}

/// Maps encoded rows to one scalar prediction per row.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ArtifactError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message() {
        let err = PredictError::MissingColumns(vec!["latitude".into(), "population".into()]);
        assert_eq!(
            err.to_string(),
            r#"Missing required columns: ["latitude", "population"]"#
        );
    }

    #[test]
    fn test_artifact_error_keeps_message() {
        let err: PredictError = ArtifactError::new("X has 3 features").into();
        assert_eq!(err, PredictError::TransformOrPredictFailure("X has 3 features".into()));
        assert_eq!(err.to_string(), "X has 3 features");
    }
}
