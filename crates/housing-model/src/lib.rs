//! Inference over pre-trained housing price artifacts.
//!
//! Both front ends go through [`InferenceFacade`], which owns a
//! [`Transformer`](housing_core::Transformer) and a
//! [`Predictor`](housing_core::Predictor) loaded once by [`ArtifactStore`].

mod facade;
mod model;
mod pipeline;
mod store;
mod summary;
mod tabular;

pub use facade::InferenceFacade;
pub use model::{ForestModel, LinearModel, RegressionModel, RegressionTree};
pub use pipeline::{CategoricalStep, FeaturePipeline, HandleUnknown, NumericStep};
pub use store::{ArtifactStore, StoreError};
pub use summary::PredictionSummary;
pub use tabular::{read_table, write_table, CsvError};
