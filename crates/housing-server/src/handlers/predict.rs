//! Prediction HTTP handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::Json;
use housing_core::{RecordTable, INVALID_REQUEST_FORMAT};
use housing_model::read_table;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::dto::PredictResponse;
use crate::error::AppError;
use crate::state::AppState;

/// POST /predict - score a JSON body of the form `{"data": [record, ...]}`.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<PredictResponse>, AppError> {
    let facade = state.facade()?;

    let records = parse_records(&body)?;
    let table = RecordTable::from_json_records(&records)?;

    // An empty batch has no columns to check or transform.
    if table.is_empty() {
        return Ok(Json(Vec::<f64>::new().into()));
    }
    facade.require_columns(&table).inspect_err(|e| warn!("Rejected request: {}", e))?;

    let predictions = facade.predict(&table).inspect_err(|e| error!("Prediction failed: {}", e))?;
    info!("Scored {} records", predictions.len());
    Ok(Json(predictions.into()))
}

fn parse_records(body: &[u8]) -> Result<Vec<Value>, AppError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|_| AppError::BadRequest(INVALID_REQUEST_FORMAT.into()))?;
    match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(AppError::BadRequest(INVALID_REQUEST_FORMAT.into())),
        },
        _ => Err(AppError::BadRequest(INVALID_REQUEST_FORMAT.into())),
    }
}

/// POST /predict-batch - score an uploaded CSV file (multipart field `file`).
///
/// Unless `HOUSING_BATCH_COLUMN_CHECK` is set, missing columns are reported by
/// the pipeline itself and surface as a 500.
pub async fn predict_batch(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let facade = state.facade()?;

    let mut multipart = multipart.map_err(|_| AppError::BadRequest("No file provided".into()))?;
    let (filename, content) = read_file_field(&mut multipart).await?;
    info!("Received batch upload: {} ({} bytes)", filename, content.len());

    let table = read_table(content.as_ref()).inspect_err(|e| error!("Failed to read CSV: {}", e))?;

    if state.batch_column_check {
        facade.require_columns(&table)?;
    }

    let predictions = facade.predict(&table).inspect_err(|e| error!("Prediction failed: {}", e))?;
    info!("Scored {} records from {}", predictions.len(), filename);
    Ok(Json(predictions.into()))
}

async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_owned) else {
            break;
        };
        if filename.is_empty() {
            return Err(AppError::BadRequest("Empty filename".into()));
        }
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        return Ok((filename, content));
    }
    Err(AppError::BadRequest("No file provided".into()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use housing_config::{ArtifactPaths, ServiceConfig};
    use housing_model::ArtifactStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::build_router;
    use crate::state::AppState;

    const SAMPLE_CSV: &str = include_str!("../../../housing-model/testdata/sample.csv");
    const BOUNDARY: &str = "housing-test-boundary";

    fn testdata(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../housing-model/testdata")
            .join(name)
    }

    fn state(loaded: bool, batch_column_check: bool) -> Arc<AppState> {
        let config = ServiceConfig { batch_column_check, ..ServiceConfig::default() };
        let facade = loaded.then(|| {
            ArtifactStore::load(&ArtifactPaths {
                model: testdata("model.pkl"),
                pipeline: testdata("pipeline.pkl"),
            })
            .unwrap()
        });
        Arc::new(AppState::new(facade, &config))
    }

    fn reference_record() -> Value {
        json!({
            "longitude": -122.23,
            "latitude": 37.88,
            "housing_median_age": 41.0,
            "total_rooms": 880.0,
            "total_bedrooms": 129.0,
            "population": 322.0,
            "households": 126.0,
            "median_income": 8.3252,
            "ocean_proximity": "NEAR BAY"
        })
    }

    fn json_request(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn upload_request(field: &str, filename: &str, csv: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             {csv}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/predict-batch")
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(state: Arc<AppState>, req: Request<Body>) -> (StatusCode, Value) {
        let res = build_router(state).oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn predictions(body: &Value) -> Vec<f64> {
        body["predictions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_health() {
        let req = || Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, body) = send(state(true, false), req()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "healthy", "model_loaded": true}));

        let (status, body) = send(state(false, false), req()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["model_loaded"], json!(false));
    }

    #[tokio::test]
    async fn test_predict_single_record() {
        let body = json!({"data": [reference_record()]}).to_string();
        let (status, body) = send(state(true, false), json_request("/predict", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], json!(1));
        assert_eq!(predictions(&body).len(), 1);
    }

    #[tokio::test]
    async fn test_predict_empty_batch() {
        let (status, body) =
            send(state(true, false), json_request("/predict", r#"{"data": []}"#.into())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"predictions": [], "count": 0}));
    }

    #[tokio::test]
    async fn test_predict_malformed_bodies() {
        for raw in ["not json", "[]", r#"{"records": []}"#, r#"{"data": {"a": 1}}"#, r#"{"data": [1, 2]}"#] {
            let (status, body) = send(state(true, false), json_request("/predict", raw.into())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {raw}");
            assert!(body["error"].as_str().unwrap().starts_with("Invalid request format"));
        }
    }

    #[tokio::test]
    async fn test_predict_missing_columns_listed_exactly() {
        let mut record = reference_record();
        let obj = record.as_object_mut().unwrap();
        obj.remove("total_bedrooms");
        obj.remove("ocean_proximity");
        obj.insert("unexpected".into(), json!(1));

        let body = json!({"data": [record]}).to_string();
        let (status, body) = send(state(true, false), json_request("/predict", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["missing_columns"], json!(["total_bedrooms", "ocean_proximity"]));
        assert!(body["error"].as_str().unwrap().starts_with("Missing required columns"));
    }

    #[tokio::test]
    async fn test_predict_artifact_failure_is_500() {
        let mut record = reference_record();
        record["median_income"] = json!("plenty");

        let body = json!({"data": [record]}).to_string();
        let (status, body) = send(state(true, false), json_request("/predict", body)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], json!("could not convert string to float: 'plenty'"));
    }

    #[tokio::test]
    async fn test_predict_without_artifacts_is_503() {
        let body = json!({"data": [reference_record()]}).to_string();
        let (status, body) = send(state(false, false), json_request("/predict", body)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], json!("Model not loaded"));

        let (status, _) = send(state(false, false), upload_request("file", "a.csv", SAMPLE_CSV)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_batch_matches_json_predictions() {
        let (status, batch) =
            send(state(true, false), upload_request("file", "sample.csv", SAMPLE_CSV)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(batch["count"], json!(5));

        let table = housing_model::read_table(SAMPLE_CSV.as_bytes()).unwrap();
        let records: Vec<Value> = table
            .rows()
            .iter()
            .map(|row| {
                let obj = table
                    .columns()
                    .iter()
                    .zip(row)
                    .map(|(c, cell)| {
                        let v = match cell.as_f64() {
                            Some(n) => json!(n),
                            None => json!(cell.to_string()),
                        };
                        (c.clone(), v)
                    })
                    .collect::<serde_json::Map<_, _>>();
                Value::Object(obj)
            })
            .collect();

        let body = json!({"data": records}).to_string();
        let (status, single) = send(state(true, false), json_request("/predict", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(predictions(&batch), predictions(&single));
    }

    #[tokio::test]
    async fn test_batch_without_file_field() {
        let (status, body) =
            send(state(true, false), upload_request("upload", "sample.csv", SAMPLE_CSV)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("No file provided"));

        let req = json_request("/predict-batch", "{}".into());
        let (status, _) = send(state(true, false), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_batch_missing_columns_asymmetry() {
        let csv = "longitude,latitude\n-122.23,37.88\n";

        let (status, body) = send(state(true, false), upload_request("file", "a.csv", csv)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().starts_with("columns are missing"));

        let (status, body) = send(state(true, true), upload_request("file", "a.csv", csv)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["missing_columns"].as_array().unwrap().len(), 7);
    }
}
