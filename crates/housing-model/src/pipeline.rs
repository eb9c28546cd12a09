//! Column transformer artifact: imputation and scaling for numeric columns,
//! one-hot encoding for categorical columns.

use housing_core::{ArtifactError, Cell, FeatureMatrix, RecordTable, Transformer};
use serde::{Deserialize, Serialize};

/// Impute-then-standardize step for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStep {
    pub column: String,
    /// Value substituted for missing cells (the training median).
    pub fill: f64,
    pub mean: f64,
    #[serde(default = "unit_scale")]
    pub scale: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl NumericStep {
    fn encode(&self, cell: &Cell) -> Result<f64, ArtifactError> {
        let raw = match cell {
            Cell::Number(v) => *v,
            Cell::Missing => self.fill,
            Cell::Text(s) => {
                return Err(ArtifactError::new(format!(
                    "could not convert string to float: '{s}'"
                )))
            }
        };
        // Constant columns are only centered.
        let scale = if self.scale == 0.0 { 1.0 } else { self.scale };
        Ok((raw - self.mean) / scale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Unknown or missing categories encode as all zeros.
    #[default]
    Ignore,
    Error,
}

/// One-hot step for one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalStep {
    pub column: String,
    pub categories: Vec<String>,
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
}

impl CategoricalStep {
    fn encode(&self, cell: &Cell, out: &mut [f64]) -> Result<(), ArtifactError> {
        let label = match cell {
            Cell::Missing => None,
            other => Some(other.to_string()),
        };
        let hit = label
            .as_deref()
            .and_then(|l| self.categories.iter().position(|c| c == l));

        match (hit, self.handle_unknown) {
            (Some(i), _) => out[i] = 1.0,
            (None, HandleUnknown::Ignore) => {}
            (None, HandleUnknown::Error) => {
                return Err(ArtifactError::new(format!(
                    "Found unknown categories [{:?}] in column '{}' during transform",
                    label.unwrap_or_default(),
                    self.column
                )))
            }
        }
        Ok(())
    }
}

/// Serialized feature pipeline. Output columns are the numeric steps in
/// order, followed by each categorical step's one-hot block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePipeline {
    #[serde(default)]
    pub numeric: Vec<NumericStep>,
    #[serde(default)]
    pub categorical: Vec<CategoricalStep>,
}

impl FeaturePipeline {
    /// Number of encoded output features.
    pub fn width(&self) -> usize {
        self.numeric.len() + self.categorical.iter().map(|c| c.categories.len()).sum::<usize>()
    }

    fn resolve(&self, table: &RecordTable) -> Result<(Vec<usize>, Vec<usize>), ArtifactError> {
        let wanted = self
            .numeric
            .iter()
            .map(|s| s.column.as_str())
            .chain(self.categorical.iter().map(|s| s.column.as_str()));

        let missing: Vec<&str> = wanted.filter(|c| table.column_index(c).is_none()).collect();
        if !missing.is_empty() {
            return Err(ArtifactError::new(format!("columns are missing: {missing:?}")));
        }

        let index = |c: &str| table.column_index(c).unwrap_or_default();
        Ok((
            self.numeric.iter().map(|s| index(&s.column)).collect(),
            self.categorical.iter().map(|s| index(&s.column)).collect(),
        ))
    }
}

impl Transformer for FeaturePipeline {
    fn transform(&self, table: &RecordTable) -> Result<FeatureMatrix, ArtifactError> {
        let (numeric_idx, categorical_idx) = self.resolve(table)?;
        let mut matrix = FeatureMatrix::with_cols(self.width());
        let mut buf = vec![0.0; self.width()];

        for row in table.rows() {
            buf.iter_mut().for_each(|v| *v = 0.0);

            for (slot, (step, &idx)) in self.numeric.iter().zip(&numeric_idx).enumerate() {
                buf[slot] = step.encode(&row[idx])?;
            }

            let mut offset = self.numeric.len();
            for (step, &idx) in self.categorical.iter().zip(&categorical_idx) {
                let end = offset + step.categories.len();
                step.encode(&row[idx], &mut buf[offset..end])?;
                offset = end;
            }

            matrix.push_row(&buf);
        }

        Ok(matrix)
    }
}
