//! CSV ingest and export for record tables.

use std::io::Read;

use csv::StringRecord;
use housing_core::{Cell, RecordTable};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("Error tokenizing data: {0}")]
    Csv(#[from] csv::Error),

    #[error("No columns to parse from file")]
    NoColumns,

    #[error("Error tokenizing data at line {line}: {message}")]
    Row { line: u64, message: String },

    #[error("Failed to encode CSV output: {0}")]
    Encode(String),
}

/// Reads a CSV document with a header row into a table.
///
/// Fields are trimmed; empty fields become missing cells and numeric fields
/// become numbers. Rows with a different field count than the header fail.
pub fn read_table<R: Read>(reader: R) -> Result<RecordTable, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(CsvError::NoColumns);
    }

    let mut table = RecordTable::new(headers.iter().map(String::from).collect());
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map_or(0, |p| p.line());
        table
            .push_row(record.iter().map(Cell::parse_csv).collect())
            .map_err(|message| CsvError::Row { line, message })?;
    }

    Ok(table)
}

/// Writes a table as CSV with a header row.
pub fn write_table(table: &RecordTable) -> Result<String, CsvError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|c| c.to_string()))?;
    }
    let bytes = writer.into_inner().map_err(|e| CsvError::Encode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CsvError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use housing_core::{HousingRecord, PREDICTION_COLUMN};

    const SAMPLE: &str = include_str!("../testdata/sample.csv");

    #[test]
    fn test_read_sample() {
        let table = read_table(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 5);
        assert!(table.missing_columns().is_empty());
        assert_eq!(table.rows()[0][7], Cell::Number(8.3252));
        assert_eq!(table.rows()[0][8], Cell::Text("NEAR BAY".into()));
    }

    #[test]
    fn test_empty_fields_are_missing() {
        let table = read_table("a,b\n1.5,\n".as_bytes()).unwrap();
        assert_eq!(table.rows()[0], vec![Cell::Number(1.5), Cell::Missing]);
    }

    #[test]
    fn test_ragged_rows_fail() {
        assert!(read_table("a,b\n1,2,3\n".as_bytes()).is_err());
    }

    #[test]
    fn test_empty_document_fails() {
        assert!(matches!(read_table("".as_bytes()), Err(CsvError::NoColumns)));
    }

    #[test]
    fn test_write_with_prediction_column() {
        let table = RecordTable::from_records(&[HousingRecord::reference()])
            .with_column(PREDICTION_COLUMN, &[452600.0])
            .unwrap();
        let csv = write_table(&table).unwrap();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("longitude,latitude,housing_median_age,total_rooms,total_bedrooms,population,households,median_income,ocean_proximity,predicted_median_house_value")
        );
        assert_eq!(
            lines.next(),
            Some("-122.23,37.88,41.0,880.0,129.0,322.0,126.0,8.3252,NEAR BAY,452600.0")
        );

        let reread = read_table(csv.as_bytes()).unwrap();
        assert_eq!(reread.columns().len(), 10);
        assert_eq!(reread.len(), 1);
    }
}
