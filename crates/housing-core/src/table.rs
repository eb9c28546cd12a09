//! Loosely typed tabular input shared by the JSON and CSV front ends.

use std::fmt;

use serde_json::Value;

use crate::record::HousingRecord;
use crate::{PredictError, INVALID_REQUEST_FORMAT, REQUIRED_COLUMNS};

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Converts a JSON value. Nulls and NaN become `Missing`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Missing,
            Value::Number(n) => n.as_f64().map_or(Cell::Missing, Cell::number),
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    /// Parses a raw CSV field: empty is `Missing`, numeric text is a `Number`.
    pub fn parse_csv(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Cell::Missing;
        }
        match raw.parse::<f64>() {
            Ok(v) => Cell::number(v),
            Err(_) => Cell::Text(raw.to_string()),
        }
    }

    fn number(v: f64) -> Self {
        if v.is_nan() {
            Cell::Missing
        } else {
            Cell::Number(v)
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Whole numbers keep a trailing ".0" so float columns stay recognizable.
            Cell::Number(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{v:.1}")
            }
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Missing => Ok(()),
        }
    }
}

/// Ordered columns and rows of cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RecordTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Builds a table from JSON objects.
    ///
    /// The column set is the union of keys in first-seen order; a key absent
    /// from a given record yields a `Missing` cell for that row.
    pub fn from_json_records(records: &[Value]) -> Result<Self, PredictError> {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            let Value::Object(map) = record else {
                return Err(PredictError::MalformedRequest(INVALID_REQUEST_FORMAT.into()));
            };
            for key in map.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .filter_map(Value::as_object)
            .map(|map| {
                columns
                    .iter()
                    .map(|c| map.get(c).map_or(Cell::Missing, Cell::from_json))
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// Builds a table with exactly the required columns.
    pub fn from_records(records: &[HousingRecord]) -> Self {
        let columns = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        let rows = records
            .iter()
            .map(|r| {
                let mut row: Vec<Cell> = r.numeric_values().into_iter().map(Cell::Number).collect();
                row.push(Cell::Text(r.ocean_proximity.as_str().to_string()));
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Appends a row. The row must have one cell per column.
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), String> {
        if row.len() != self.columns.len() {
            return Err(format!(
                "expected {} fields, found {}",
                self.columns.len(),
                row.len()
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterates the cells of one column, if present.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Required columns absent from this table, in schema order.
    pub fn missing_columns(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|c| self.column_index(c).is_none())
            .map(|c| c.to_string())
            .collect()
    }

    /// First `n` rows as a new table.
    pub fn head(&self, n: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Returns a copy with a numeric column appended.
    pub fn with_column(&self, name: &str, values: &[f64]) -> Result<Self, String> {
        if values.len() != self.rows.len() {
            return Err(format!(
                "column '{}' has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            ));
        }
        let mut columns = self.columns.clone();
        columns.push(name.to_string());
        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(row, v)| {
                let mut row = row.clone();
                row.push(Cell::Number(*v));
                row
            })
            .collect();
        Ok(Self { columns, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_records_union_columns() {
        let records = vec![
            json!({"longitude": -122.23, "ocean_proximity": "NEAR BAY"}),
            json!({"longitude": -122.22, "extra": 1}),
        ];
        let table = RecordTable::from_json_records(&records).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.columns().len(), 3);
        let ocean: Vec<&Cell> = table.column("ocean_proximity").unwrap().collect();
        assert_eq!(ocean[0], &Cell::Text("NEAR BAY".into()));
        assert_eq!(ocean[1], &Cell::Missing);
    }

    #[test]
    fn test_json_records_rejects_non_objects() {
        let records = vec![json!([1, 2, 3])];
        let err = RecordTable::from_json_records(&records).unwrap_err();
        assert!(matches!(err, PredictError::MalformedRequest(_)));
    }

    #[test]
    fn test_missing_columns_ignores_extras() {
        let records = vec![json!({
            "longitude": 1.0, "latitude": 2.0, "housing_median_age": 3.0,
            "total_rooms": 4.0, "population": 6.0, "households": 7.0,
            "median_income": 8.0, "surplus": "x"
        })];
        let table = RecordTable::from_json_records(&records).unwrap();
        assert_eq!(table.missing_columns(), vec!["total_bedrooms", "ocean_proximity"]);
    }

    #[test]
    fn test_from_records_has_required_columns() {
        let table = RecordTable::from_records(&[HousingRecord::reference()]);
        assert!(table.missing_columns().is_empty());
        assert_eq!(table.rows()[0][8], Cell::Text("NEAR BAY".into()));
    }

    #[test]
    fn test_parse_csv_cells() {
        assert_eq!(Cell::parse_csv(" 41.0 "), Cell::Number(41.0));
        assert_eq!(Cell::parse_csv(""), Cell::Missing);
        assert_eq!(Cell::parse_csv("NaN"), Cell::Missing);
        assert_eq!(Cell::parse_csv("INLAND"), Cell::Text("INLAND".into()));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Number(41.0).to_string(), "41.0");
        assert_eq!(Cell::Number(8.3252).to_string(), "8.3252");
        assert_eq!(Cell::Missing.to_string(), "");
    }

    #[test]
    fn test_with_column_appends() {
        let table = RecordTable::from_records(&[HousingRecord::reference()]);
        let out = table.with_column("y", &[1.5]).unwrap();
        assert_eq!(out.columns().len(), 10);
        assert_eq!(out.rows()[0][9], Cell::Number(1.5));
        assert!(table.with_column("y", &[]).is_err());
    }

    #[test]
    fn test_push_row_checks_width() {
        let mut table = RecordTable::new(vec!["a".into(), "b".into()]);
        assert!(table.push_row(vec![Cell::Missing]).is_err());
        assert!(table.push_row(vec![Cell::Missing, Cell::Number(1.0)]).is_ok());
        assert_eq!(table.head(0).len(), 0);
    }
}
