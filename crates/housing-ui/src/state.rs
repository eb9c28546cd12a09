use housing_config::ArtifactPaths;
use housing_model::{ArtifactStore, InferenceFacade};
use tokio::sync::OnceCell;
use tracing::{error, info};

/// UI state. The artifact pair is loaded on first use and kept for the
/// process lifetime, including a failed load.
pub struct UiState {
    paths: ArtifactPaths,
    facade: OnceCell<Option<InferenceFacade>>,
    pub max_upload_bytes: usize,
}

impl UiState {
    pub fn new(paths: ArtifactPaths, max_upload_bytes: usize) -> Self {
        Self {
            paths,
            facade: OnceCell::new(),
            max_upload_bytes,
        }
    }

    pub async fn facade(&self) -> Option<&InferenceFacade> {
        self.facade
            .get_or_init(|| async {
                let paths = self.paths.clone();
                match tokio::task::spawn_blocking(move || ArtifactStore::load(&paths)).await {
                    Ok(Ok(facade)) => {
                        info!("Model loaded for UI session");
                        Some(facade)
                    }
                    Ok(Err(e)) => {
                        error!("Model unavailable: {}", e);
                        None
                    }
                    Err(e) => {
                        error!("Model load task failed: {}", e);
                        None
                    }
                }
            })
            .await
            .as_ref()
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }
}
