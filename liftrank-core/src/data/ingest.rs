use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::schema::{self, RawSchema, SchemaError};
use crate::domain::RawRecord;

/// Rows scanned before CSV column types are fixed. Raw exports have long
/// runs of nulls at the top of sparse columns.
const INFER_SCHEMA_ROWS: usize = 100_000;

/// Data ingestor for CSV and Parquet exports.
pub struct DataIngestor {
    overrides: Schema,
}

impl DataIngestor {
    pub fn new() -> Self {
        Self {
            overrides: RawSchema::csv_overrides(),
        }
    }

    /// Ingest a file, choosing the reader from its extension.
    pub fn ingest(&self, path: &Path) -> Result<DataFrame, DataError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => self.ingest_csv(path),
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => self.ingest_parquet(path),
            _ => Err(DataError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Ingest CSV file. Attribute columns are forced to strings.
    pub fn ingest_csv(&self, path: &Path) -> Result<DataFrame, DataError> {
        let header = csv::Reader::from_path(path)
            .and_then(|mut reader| reader.headers().cloned())
            .map_err(|e| DataError::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        // Only override columns the file actually has; missing ones are
        // reported by schema validation with their name.
        let overrides: Schema = self
            .overrides
            .iter_fields()
            .filter(|field| header.iter().any(|h| h == field.name().as_str()))
            .collect();

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_dtype_overwrite(Some(Arc::new(overrides)))
            .finish()?
            .collect()?;

        tracing::debug!(path = %path.display(), rows = df.height(), "ingested csv");
        Ok(df)
    }

    /// Ingest Parquet file
    pub fn ingest_parquet(&self, path: &Path) -> Result<DataFrame, DataError> {
        if !path.exists() {
            return Err(DataError::Unreadable {
                path: path.to_path_buf(),
                reason: "file does not exist".to_string(),
            });
        }

        let df = LazyFrame::scan_parquet(path, Default::default())?.collect()?;
        tracing::debug!(path = %path.display(), rows = df.height(), "ingested parquet");
        Ok(df)
    }

    /// Build a raw frame from in-memory records.
    pub fn from_records(records: &[RawRecord]) -> Result<DataFrame, DataError> {
        fn text(name: &str, records: &[RawRecord], f: fn(&RawRecord) -> Option<String>) -> Column {
            Column::new(name.into(), records.iter().map(f).collect::<Vec<_>>())
        }
        fn number(name: &str, records: &[RawRecord], f: fn(&RawRecord) -> Option<f64>) -> Column {
            Column::new(name.into(), records.iter().map(f).collect::<Vec<_>>())
        }

        let df = DataFrame::new(vec![
            text(schema::SEX, records, |r| r.sex.clone()),
            text(schema::EQUIPMENT, records, |r| r.equipment.clone()),
            text(schema::DIVISION, records, |r| r.division.clone()),
            text(schema::FEDERATION, records, |r| r.federation.clone()),
            text(schema::MEET_COUNTRY, records, |r| r.meet_country.clone()),
            text(schema::WEIGHT_CLASS_KG, records, |r| r.weight_class_kg.clone()),
            number(schema::BEST3_SQUAT_KG, records, |r| r.best3_squat_kg),
            number(schema::BEST3_BENCH_KG, records, |r| r.best3_bench_kg),
            number(schema::BEST3_DEADLIFT_KG, records, |r| r.best3_deadlift_kg),
            number(schema::TOTAL_KG, records, |r| r.total_kg),
            number(schema::SQUAT4_KG, records, |r| r.squat4_kg),
            number(schema::BENCH4_KG, records, |r| r.bench4_kg),
            number(schema::DEADLIFT4_KG, records, |r| r.deadlift4_kg),
            text(schema::TESTED, records, |r| r.tested.clone()),
        ])?;
        Ok(df)
    }
}

impl Default for DataIngestor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Cannot read {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("Unsupported input format: {} (expected .csv or .parquet)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Snapshot I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("Snapshot integrity check failed: metadata hash {expected}, file hash {actual}")]
    IntegrityMismatch { expected: String, actual: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_ingestor_overrides_attribute_columns() {
        let ingestor = DataIngestor::new();
        assert!(ingestor.overrides.contains(schema::SEX));
        assert!(ingestor.overrides.contains(schema::WEIGHT_CLASS_KG));
        assert!(!ingestor.overrides.contains(schema::TOTAL_KG));
    }

    #[test]
    fn test_from_records_builds_raw_layout() {
        let records = vec![RawRecord::full_power("M", 200.0, 140.0, 250.0)];
        let df = DataIngestor::from_records(&records).unwrap();

        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), RawSchema::required_columns().len());
        assert!(RawSchema::validate(&df).is_ok());
    }

    #[test]
    fn test_unsupported_extension() {
        let result = DataIngestor::new().ingest(Path::new("records.xlsx"));
        assert!(matches!(result, Err(DataError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let result = DataIngestor::new().ingest(Path::new("/nonexistent/liftrank/raw.csv"));
        assert!(matches!(result, Err(DataError::Unreadable { .. })));
    }

    #[test]
    fn test_csv_weight_class_stays_string() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "Sex,Equipment,Division,Federation,MeetCountry,WeightClassKg,Best3SquatKg,Best3BenchKg,Best3DeadliftKg,TotalKg,Squat4Kg,Bench4Kg,Deadlift4Kg,Tested"
        )
        .unwrap();
        writeln!(file, "M,Raw,Open,IPF,USA,90,200,140,250,590,,,,Yes").unwrap();
        writeln!(file, "F,Raw,Open,IPF,USA,82.5,150,80,180,410,,,,").unwrap();
        drop(file);

        let df = DataIngestor::new().ingest(&path).unwrap();
        let classes = df.column(schema::WEIGHT_CLASS_KG).unwrap();
        assert_eq!(classes.dtype(), &DataType::String);

        let values: Vec<Option<&str>> = classes
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some("90"), Some("82.5")]);
    }
}
