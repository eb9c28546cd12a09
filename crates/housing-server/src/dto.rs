use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predictions: Vec<f64>,
    pub count: usize,
}

impl From<Vec<f64>> for PredictResponse {
    fn from(predictions: Vec<f64>) -> Self {
        Self { count: predictions.len(), predictions }
    }
}
