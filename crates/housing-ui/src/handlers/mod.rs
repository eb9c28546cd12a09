//! Page handlers for the interactive UI.

pub mod batch;
pub mod single;

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use housing_core::HousingRecord;

use crate::html::{self, Banner};
use crate::state::UiState;

pub(crate) fn unavailable(state: &UiState) -> Html<String> {
    let paths = state.paths();
    html::unavailable(
        &paths.model.display().to_string(),
        &paths.pipeline.display().to_string(),
    )
}

/// GET / - both input modes, or the error state when artifacts are missing.
pub async fn index(State(state): State<Arc<UiState>>) -> Html<String> {
    if state.facade().await.is_none() {
        return unavailable(&state);
    }

    let body = format!(
        "{}{}{}",
        html::banner(Banner::Success, "Model loaded successfully!"),
        html::single_form(&HousingRecord::reference()),
        html::upload_form()
    );
    html::page(&body)
}
