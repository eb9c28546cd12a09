//! Regression model artifacts.

use housing_core::{ArtifactError, FeatureMatrix, Predictor};
use serde::{Deserialize, Serialize};

/// Ordinary least squares model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept + self.coefficients.iter().zip(row).map(|(c, x)| c * x).sum::<f64>()
    }
}

/// A single regression tree in flat node-array form.
///
/// Node `i` is a leaf when `left[i] == -1`. Otherwise samples with
/// `x[feature[i]] <= threshold[i]` descend to `left[i]`, the rest to `right[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub left: Vec<i64>,
    pub right: Vec<i64>,
    pub feature: Vec<usize>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl RegressionTree {
    const LEAF: i64 = -1;

    fn validate(&self, n_features: usize) -> Result<(), String> {
        let n = self.value.len();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        let lens = [self.left.len(), self.right.len(), self.feature.len(), self.threshold.len()];
        if lens.iter().any(|&l| l != n) {
            return Err(format!("node arrays have inconsistent lengths: {lens:?} vs {n}"));
        }

        for i in 0..n {
            if self.left[i] == Self::LEAF {
                continue;
            }
            // Children always follow their parent, so traversal terminates.
            let in_range = |c: i64| c > i as i64 && (c as usize) < n;
            if !in_range(self.left[i]) || !in_range(self.right[i]) {
                return Err(format!("node {i} has invalid children"));
            }
            if self.feature[i] >= n_features {
                return Err(format!(
                    "node {i} splits on feature {} of {n_features}",
                    self.feature[i]
                ));
            }
        }
        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = 0usize;
        while self.left[node] != Self::LEAF {
            node = if row[self.feature[node]] <= self.threshold[node] {
                self.left[node] as usize
            } else {
                self.right[node] as usize
            };
        }
        self.value[node]
    }
}

/// Averaged ensemble of regression trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub n_features: usize,
    pub trees: Vec<RegressionTree>,
}

impl ForestModel {
    fn predict_row(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        total / self.trees.len() as f64
    }
}

/// Serialized regression model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionModel {
    Linear(LinearModel),
    Forest(ForestModel),
}

impl RegressionModel {
    pub fn n_features(&self) -> usize {
        match self {
            RegressionModel::Linear(m) => m.coefficients.len(),
            RegressionModel::Forest(m) => m.n_features,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            RegressionModel::Linear(_) => "LinearRegression",
            RegressionModel::Forest(_) => "RandomForestRegressor",
        }
    }

    /// Checks structural integrity after deserialization.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            RegressionModel::Linear(_) => Ok(()),
            RegressionModel::Forest(m) if m.trees.is_empty() => Err("forest has no trees".into()),
            RegressionModel::Forest(m) => m
                .trees
                .iter()
                .enumerate()
                .try_for_each(|(i, t)| t.validate(m.n_features).map_err(|e| format!("tree {i}: {e}"))),
        }
    }
}

impl Predictor for RegressionModel {
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ArtifactError> {
        let expected = self.n_features();
        if features.cols() != expected {
            return Err(ArtifactError::new(format!(
                "X has {} features, but {} is expecting {} features as input.",
                features.cols(),
                self.name(),
                expected
            )));
        }

        let predictions = match self {
            RegressionModel::Linear(m) => features.iter_rows().map(|r| m.predict_row(r)).collect(),
            RegressionModel::Forest(m) => features.iter_rows().map(|r| m.predict_row(r)).collect(),
        };
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[f64]]) -> FeatureMatrix {
        let mut m = FeatureMatrix::with_cols(rows[0].len());
        rows.iter().for_each(|r| m.push_row(r));
        m
    }

    fn stump(threshold: f64, low: f64, high: f64) -> RegressionTree {
        RegressionTree {
            left: vec![1, -1, -1],
            right: vec![2, -1, -1],
            feature: vec![0, 0, 0],
            threshold: vec![threshold, 0.0, 0.0],
            value: vec![0.0, low, high],
        }
    }

    #[test]
    fn test_linear_predict() {
        let model = RegressionModel::Linear(LinearModel {
            coefficients: vec![2.0, -1.0],
            intercept: 10.0,
        });
        let out = model.predict(&matrix(&[&[1.0, 1.0], &[0.0, 4.0]])).unwrap();
        assert_eq!(out, vec![11.0, 6.0]);
    }

    #[test]
    fn test_forest_averages_trees() {
        let model = RegressionModel::Forest(ForestModel {
            n_features: 1,
            trees: vec![stump(0.5, 100.0, 200.0), stump(1.5, 300.0, 500.0)],
        });
        model.validate().unwrap();

        let out = model.predict(&matrix(&[&[0.0], &[1.0], &[2.0]])).unwrap();
        assert_eq!(out, vec![200.0, 250.0, 350.0]);
    }

    #[test]
    fn test_feature_count_mismatch() {
        let model = RegressionModel::Linear(LinearModel {
            coefficients: vec![1.0, 1.0, 1.0],
            intercept: 0.0,
        });
        let err = model.predict(&matrix(&[&[1.0, 2.0]])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "X has 2 features, but LinearRegression is expecting 3 features as input."
        );
    }

    #[test]
    fn test_validate_rejects_cycles() {
        let mut tree = stump(0.5, 1.0, 2.0);
        tree.left[0] = 0;
        let model = RegressionModel::Forest(ForestModel { n_features: 1, trees: vec![tree] });
        assert!(model.validate().is_err());

        let empty = RegressionModel::Forest(ForestModel { n_features: 1, trees: vec![] });
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_tagged_serialization() {
        let model: RegressionModel =
            serde_json::from_str(r#"{"kind": "linear", "coefficients": [1.5], "intercept": 2.0}"#)
                .unwrap();
        assert_eq!(model.n_features(), 1);
    }
}
