//! Loading artifacts from disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use housing_config::ArtifactPaths;
use housing_core::PredictError;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::info;

use crate::facade::InferenceFacade;
use crate::model::RegressionModel;
use crate::pipeline::FeaturePipeline;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{} not found", display_paths(.0))]
    NotFound(Vec<PathBuf>),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid artifact {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" and ")
}

impl From<StoreError> for PredictError {
    fn from(err: StoreError) -> Self {
        PredictError::ArtifactsNotLoaded(err.to_string())
    }
}

/// Reads the pipeline and model artifacts.
pub struct ArtifactStore;

impl ArtifactStore {
    /// Loads both artifacts after confirming that both files exist.
    pub fn load(paths: &ArtifactPaths) -> Result<InferenceFacade, StoreError> {
        let missing: Vec<PathBuf> = [&paths.model, &paths.pipeline]
            .into_iter()
            .filter(|p| !p.exists())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::NotFound(missing));
        }

        let pipeline: FeaturePipeline = read_json(&paths.pipeline)?;
        let model: RegressionModel = read_json(&paths.model)?;

        model.validate().map_err(|message| StoreError::Invalid {
            path: paths.model.clone(),
            message,
        })?;
        if pipeline.width() != model.n_features() {
            return Err(StoreError::Invalid {
                path: paths.model.clone(),
                message: format!(
                    "model expects {} features but pipeline produces {}",
                    model.n_features(),
                    pipeline.width()
                ),
            });
        }

        info!(
            model = %paths.model.display(),
            pipeline = %paths.pipeline.display(),
            features = pipeline.width(),
            "Artifacts loaded"
        );

        Ok(InferenceFacade::new(Arc::new(pipeline), Arc::new(model)))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
