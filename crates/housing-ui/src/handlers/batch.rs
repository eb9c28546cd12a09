//! CSV upload, preview, batch prediction and download.
//!
//! The uploaded CSV text travels with each follow-up form post, so no
//! upload is held on the server between steps.

use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use housing_core::RecordTable;
use housing_model::{read_table, write_table, InferenceFacade, PredictionSummary};
use serde::Deserialize;
use tracing::{error, info};

use crate::html::{self, Banner};
use crate::state::UiState;

const PREVIEW_ROWS: usize = 10;

#[derive(Debug, Deserialize)]
pub struct CsvForm {
    csv: String,
}

/// POST /batch/preview - parse the upload and show its first rows.
pub async fn preview(State(state): State<Arc<UiState>>, multipart: Multipart) -> Html<String> {
    if state.facade().await.is_none() {
        return super::unavailable(&state);
    }

    let csv = match read_upload(multipart).await {
        Ok(csv) => csv,
        Err(e) => return error_page(&e),
    };
    let table = match read_table(csv.as_bytes()) {
        Ok(t) => t,
        Err(e) => return error_page(&e.to_string()),
    };
    info!("Previewing upload with {} records", table.len());

    let body = format!(
        "{}<h3>Preview Input Data</h3>{}{}",
        html::banner(Banner::Info, &format!("Loaded {} records", table.len())),
        html::table(&table.head(PREVIEW_ROWS)),
        html::carry_form("/batch/predict", &csv, "Generate Predictions")
    );
    html::page(&body)
}

async fn read_upload(mut multipart: Multipart) -> Result<String, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
        if field.name() == Some("file") {
            let text = field.text().await.map_err(|e| e.body_text())?;
            return Ok(text);
        }
    }
    Err("No file provided".into())
}

/// POST /batch/predict - score the whole upload and show summary statistics.
pub async fn predict(
    State(state): State<Arc<UiState>>,
    form: Result<Form<CsvForm>, FormRejection>,
) -> Html<String> {
    let Some(facade) = state.facade().await else {
        return super::unavailable(&state);
    };

    let (csv, augmented, predictions) = match score(facade, form) {
        Ok(scored) => scored,
        Err(e) => return error_page(&e),
    };
    info!("Generated {} batch predictions", predictions.len());

    let metrics = PredictionSummary::from_predictions(&predictions)
        .map(|s| html::metrics(&s))
        .unwrap_or_default();

    let body = format!(
        "{}{}{}{}",
        html::banner(
            Banner::Success,
            &format!("Generated {} predictions!", predictions.len())
        ),
        metrics,
        html::table(&augmented),
        html::carry_form("/batch/download", &csv, "Download Predictions as CSV")
    );
    html::page(&body)
}

/// POST /batch/download - the augmented table as `predictions.csv`.
pub async fn download(
    State(state): State<Arc<UiState>>,
    form: Result<Form<CsvForm>, FormRejection>,
) -> Response {
    let Some(facade) = state.facade().await else {
        return super::unavailable(&state).into_response();
    };

    let output = score(facade, form).and_then(|(_, augmented, _)| {
        write_table(&augmented).map_err(|e| e.to_string())
    });
    match output {
        Ok(csv) => (
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"predictions.csv\""),
            ],
            csv,
        )
            .into_response(),
        Err(e) => error_page(&e).into_response(),
    }
}

fn score(
    facade: &InferenceFacade,
    form: Result<Form<CsvForm>, FormRejection>,
) -> Result<(String, RecordTable, Vec<f64>), String> {
    let Form(CsvForm { csv }) = form.map_err(|e| e.body_text())?;
    let table = read_table(csv.as_bytes()).map_err(|e| e.to_string())?;
    let (augmented, predictions) = facade.predict_table(&table).map_err(|e| {
        error!("Batch prediction failed: {}", e);
        e.to_string()
    })?;
    Ok((csv, augmented, predictions))
}

fn error_page(message: &str) -> Html<String> {
    let body = format!(
        "{}{}",
        html::banner(Banner::Error, &format!("Error processing file: {message}")),
        html::upload_form()
    );
    html::page(&body)
}
