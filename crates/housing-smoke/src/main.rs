//! Calls `/health` and `/predict` on a running server and prints the responses.
//!
//! Usage: `housing-smoke [BASE_URL]`

use std::env;
use std::process::ExitCode;

use housing_config::ServiceConfig;
use housing_core::{HousingRecord, OceanProximity};
use reqwest::{Client, Response};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
enum SmokeError {
    #[error("Could not connect to the API. Make sure the server is running on {0}")]
    Connection(String),

    #[error("{0}")]
    Other(String),
}

impl SmokeError {
    fn from_reqwest(err: reqwest::Error, base_url: &str) -> Self {
        if err.is_connect() {
            SmokeError::Connection(base_url.to_string())
        } else {
            SmokeError::Other(err.to_string())
        }
    }
}

fn sample_records() -> Vec<HousingRecord> {
    vec![
        HousingRecord::reference(),
        HousingRecord {
            longitude: -122.22,
            latitude: 37.86,
            housing_median_age: 21.0,
            total_rooms: 7099.0,
            total_bedrooms: 1106.0,
            population: 2401.0,
            households: 1138.0,
            median_income: 8.3014,
            ocean_proximity: OceanProximity::NearBay,
        },
    ]
}

async fn print_response(response: Response) -> Result<(), reqwest::Error> {
    println!("Status Code: {}", response.status().as_u16());
    let text = response.text().await?;
    let pretty = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or(text);
    println!("Response: {pretty}\n");
    Ok(())
}

async fn check_health(client: &Client, base_url: &str) -> Result<(), reqwest::Error> {
    println!("Testing health endpoint...");
    let url = format!("{base_url}/health");
    debug!("GET {}", url);
    let response = client.get(url).send().await?;
    print_response(response).await
}

async fn check_predict(client: &Client, base_url: &str) -> Result<(), reqwest::Error> {
    println!("Testing prediction endpoint...");
    let url = format!("{base_url}/predict");
    debug!("POST {}", url);
    let response = client
        .post(url)
        .json(&json!({ "data": sample_records() }))
        .send()
        .await?;
    print_response(response).await
}

async fn run(client: &Client, base_url: &str) -> Result<(), SmokeError> {
    check_health(client, base_url)
        .await
        .map_err(|e| SmokeError::from_reqwest(e, base_url))?;
    check_predict(client, base_url)
        .await
        .map_err(|e| SmokeError::from_reqwest(e, base_url))?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .compact()
        .init();

    let base_url = match env::args().nth(1) {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => match ServiceConfig::from_env() {
            Ok(config) => config.api_url,
            Err(e) => {
                println!("Error: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    match run(&Client::new(), &base_url).await {
        Ok(()) => {
            println!("All tests completed!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
