use serde::Serialize;

/// Aggregate statistics over a batch of predictions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl PredictionSummary {
    /// Returns `None` for an empty batch.
    pub fn from_predictions(predictions: &[f64]) -> Option<Self> {
        if predictions.is_empty() {
            return None;
        }
        let sum: f64 = predictions.iter().sum();
        let min = predictions.iter().copied().fold(f64::INFINITY, f64::min);
        let max = predictions.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            count: predictions.len(),
            mean: sum / predictions.len() as f64,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let summary = PredictionSummary::from_predictions(&[100.0, 300.0, 200.0]).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.mean, 200.0);
        assert_eq!(summary.min, 100.0);
        assert_eq!(summary.max, 300.0);
    }

    #[test]
    fn test_empty_summary() {
        assert!(PredictionSummary::from_predictions(&[]).is_none());
    }
}
