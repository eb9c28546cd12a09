use housing_config::ServiceConfig;
use housing_core::PredictError;
use housing_model::InferenceFacade;

/// Read-only state shared by every handler.
pub struct AppState {
    facade: Option<InferenceFacade>,
    pub batch_column_check: bool,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(facade: Option<InferenceFacade>, config: &ServiceConfig) -> Self {
        Self {
            facade,
            batch_column_check: config.batch_column_check,
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.facade.is_some()
    }

    pub fn facade(&self) -> Result<&InferenceFacade, PredictError> {
        self.facade
            .as_ref()
            .ok_or_else(|| PredictError::ArtifactsNotLoaded("artifacts were not loaded at startup".into()))
    }
}
