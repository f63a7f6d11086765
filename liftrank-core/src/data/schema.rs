use polars::prelude::*;

pub const SEX: &str = "Sex";
pub const EQUIPMENT: &str = "Equipment";
pub const DIVISION: &str = "Division";
pub const FEDERATION: &str = "Federation";
pub const MEET_COUNTRY: &str = "MeetCountry";
pub const WEIGHT_CLASS_KG: &str = "WeightClassKg";
pub const BEST3_SQUAT_KG: &str = "Best3SquatKg";
pub const BEST3_BENCH_KG: &str = "Best3BenchKg";
pub const BEST3_DEADLIFT_KG: &str = "Best3DeadliftKg";
pub const TOTAL_KG: &str = "TotalKg";
pub const SQUAT4_KG: &str = "Squat4Kg";
pub const BENCH4_KG: &str = "Bench4Kg";
pub const DEADLIFT4_KG: &str = "Deadlift4Kg";
pub const TESTED: &str = "Tested";

/// Columns holding categorical values. Stored as strings so that filter
/// matching is exact string equality.
pub const ATTRIBUTE_COLUMNS: [&str; 7] = [
    SEX,
    EQUIPMENT,
    DIVISION,
    FEDERATION,
    MEET_COUNTRY,
    WEIGHT_CLASS_KG,
    TESTED,
];

pub const LIFT_COLUMNS: [&str; 4] = [BEST3_SQUAT_KG, BEST3_BENCH_KG, BEST3_DEADLIFT_KG, TOTAL_KG];

pub const FOURTH_ATTEMPT_COLUMNS: [&str; 3] = [SQUAT4_KG, BENCH4_KG, DEADLIFT4_KG];

/// How a frame carries the 4th-attempt columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FourthAttempts {
    /// All three columns present (raw export).
    Present,
    /// None of the three present (already canonical).
    Absent,
}

/// Expected layout of a raw competition export.
pub struct RawSchema;

impl RawSchema {
    /// Every column a raw export must carry.
    pub fn required_columns() -> Vec<&'static str> {
        CanonicalSchema::required_columns()
            .into_iter()
            .chain(FOURTH_ATTEMPT_COLUMNS)
            .collect()
    }

    /// Dtype overrides applied when reading CSV, so that e.g. a weight class
    /// `90` is read as the string `"90"` rather than an integer.
    pub fn csv_overrides() -> Schema {
        Schema::from_iter(
            ATTRIBUTE_COLUMNS
                .iter()
                .map(|name| Field::new((*name).into(), DataType::String)),
        )
    }

    /// Check that the frame is normalizable.
    ///
    /// A frame with none of the 4th-attempt columns is accepted as already
    /// 3-attempt-only; a frame with only some of them is malformed.
    pub fn validate(df: &DataFrame) -> Result<FourthAttempts, SchemaError> {
        require_columns(df, &CanonicalSchema::required_columns())?;

        let present: Vec<&str> = FOURTH_ATTEMPT_COLUMNS
            .iter()
            .copied()
            .filter(|name| df.column(name).is_ok())
            .collect();

        match present.len() {
            0 => Ok(FourthAttempts::Absent),
            n if n == FOURTH_ATTEMPT_COLUMNS.len() => Ok(FourthAttempts::Present),
            _ => {
                let missing = FOURTH_ATTEMPT_COLUMNS
                    .iter()
                    .find(|name| !present.contains(*name))
                    .copied()
                    .unwrap_or(SQUAT4_KG);
                Err(SchemaError::MissingColumn(missing.to_string()))
            }
        }
    }
}

/// Expected layout of a canonical snapshot.
pub struct CanonicalSchema;

impl CanonicalSchema {
    pub fn required_columns() -> Vec<&'static str> {
        vec![
            SEX,
            EQUIPMENT,
            DIVISION,
            FEDERATION,
            MEET_COUNTRY,
            WEIGHT_CLASS_KG,
            BEST3_SQUAT_KG,
            BEST3_BENCH_KG,
            BEST3_DEADLIFT_KG,
            TOTAL_KG,
            TESTED,
        ]
    }

    /// Validate a loaded snapshot: required columns present, attributes are
    /// strings, lift columns are numeric and no 4th-attempt column survived.
    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        require_columns(df, &Self::required_columns())?;

        for name in FOURTH_ATTEMPT_COLUMNS {
            if df.column(name).is_ok() {
                return Err(SchemaError::UnexpectedColumn(name.to_string()));
            }
        }

        for name in ATTRIBUTE_COLUMNS {
            let dtype = df.column(name)?.dtype().clone();
            if dtype != DataType::String {
                return Err(SchemaError::TypeMismatch {
                    column: name.to_string(),
                    expected: DataType::String,
                    actual: dtype,
                });
            }
        }

        for name in LIFT_COLUMNS {
            let dtype = df.column(name)?.dtype().clone();
            if !(dtype.is_integer() || dtype.is_float()) {
                return Err(SchemaError::NotNumeric {
                    column: name.to_string(),
                    actual: dtype,
                });
            }
        }

        Ok(())
    }
}

fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<(), SchemaError> {
    for name in columns {
        if df.column(name).is_err() {
            return Err(SchemaError::MissingColumn(name.to_string()));
        }
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Column {0} must not appear in a canonical snapshot")]
    UnexpectedColumn(String),

    #[error("Type mismatch in column {column}: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },

    #[error("Column {column} must be numeric, got {actual:?}")]
    NotNumeric { column: String, actual: DataType },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}
