//! Single-record prediction form.

use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::Html;
use axum::Form;
use housing_core::{HousingRecord, RecordTable};
use serde::Deserialize;
use tracing::{info, warn};

use crate::html::{self, Banner};
use crate::state::UiState;

#[derive(Debug, Deserialize)]
pub struct SingleForm {
    longitude: f64,
    latitude: f64,
    housing_median_age: f64,
    total_rooms: f64,
    total_bedrooms: f64,
    population: f64,
    households: f64,
    median_income: f64,
    ocean_proximity: String,
}

impl TryFrom<SingleForm> for HousingRecord {
    type Error = String;

    fn try_from(form: SingleForm) -> Result<Self, Self::Error> {
        Ok(HousingRecord {
            longitude: form.longitude,
            latitude: form.latitude,
            housing_median_age: form.housing_median_age,
            total_rooms: form.total_rooms,
            total_bedrooms: form.total_bedrooms,
            population: form.population,
            households: form.households,
            median_income: form.median_income,
            ocean_proximity: form.ocean_proximity.parse()?,
        })
    }
}

/// POST /predict - score one record and echo it back.
pub async fn predict(
    State(state): State<Arc<UiState>>,
    form: Result<Form<SingleForm>, FormRejection>,
) -> Html<String> {
    let Some(facade) = state.facade().await else {
        return super::unavailable(&state);
    };

    let record = form
        .map_err(|e| e.body_text())
        .and_then(|Form(f)| HousingRecord::try_from(f));
    let record = match record {
        Ok(r) => r,
        Err(e) => {
            warn!("Rejected form input: {}", e);
            return error_page(&HousingRecord::reference(), &e);
        }
    };

    match facade.predict_record(&record) {
        Ok(value) => {
            info!("Single prediction: {:.2}", value);
            let body = format!(
                "{}<h3>Input Details</h3>{}{}",
                html::banner(
                    Banner::Success,
                    &format!("Predicted Median House Value: {}", html::format_currency(value))
                ),
                html::table(&RecordTable::from_records(std::slice::from_ref(&record))),
                html::single_form(&record)
            );
            html::page(&body)
        }
        Err(e) => error_page(&record, &e.to_string()),
    }
}

fn error_page(record: &HousingRecord, message: &str) -> Html<String> {
    let body = format!(
        "{}{}",
        html::banner(Banner::Error, &format!("Error making prediction: {message}")),
        html::single_form(record)
    );
    html::page(&body)
}
