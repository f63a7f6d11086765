//! Raw export → canonical table.
//!
//! Steps, in order:
//! 1. Float64 columns are stored as Float32 (when the range fits), attribute
//!    columns as strings
//! 2. rows whose sex is not exactly `M` or `F` are dropped
//! 3. a null `Tested` becomes `"No"`
//! 4. exact duplicate rows collapse to their first occurrence
//! 5. rows without a total are dropped
//! 6. rows with any 4th attempt are dropped, then the 4th-attempt columns
//! 7. integer columns shrink to the narrowest type holding their min and max

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::ingest::DataError;
use crate::data::schema::{
    FourthAttempts, RawSchema, ATTRIBUTE_COLUMNS, BENCH4_KG, DEADLIFT4_KG,
    FOURTH_ATTEMPT_COLUMNS, SEX, SQUAT4_KG, TESTED, TOTAL_KG,
};

/// Value written into `Tested` where the export left it empty.
pub const UNTESTED: &str = "No";

/// Per-step accounting of a normalization run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeReport {
    pub input_rows: usize,
    pub dropped_invalid_sex: usize,
    pub dropped_duplicates: usize,
    pub dropped_missing_total: usize,
    pub dropped_fourth_attempt: usize,
    pub output_rows: usize,
    /// Integer columns narrowed in step 7, with their final dtype.
    pub shrunk_columns: Vec<(String, String)>,
}

impl NormalizeReport {
    pub fn dropped(&self) -> usize {
        self.dropped_invalid_sex
            + self.dropped_duplicates
            + self.dropped_missing_total
            + self.dropped_fourth_attempt
    }
}

/// A canonical table together with the report of how it was produced.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub table: DataFrame,
    pub report: NormalizeReport,
}

/// Normalizer for raw competition exports
pub struct Normalizer;

impl Normalizer {
    /// Normalize a raw frame into a canonical table.
    ///
    /// Deterministic, and idempotent over its own output. Fails without
    /// producing anything if a required column is missing.
    pub fn normalize(raw: DataFrame) -> Result<Normalized, DataError> {
        let layout = RawSchema::validate(&raw)?;
        let mut report = NormalizeReport {
            input_rows: raw.height(),
            ..Default::default()
        };

        let casts = Self::storage_casts(&raw)?;
        let df = raw.lazy().with_columns(casts).collect()?;

        let (df, dropped) = Self::retain(df, Self::valid_sex())?;
        report.dropped_invalid_sex = dropped;
        tracing::debug!(dropped, "removed rows with sex other than M/F");

        let df = df
            .lazy()
            .with_column(col(TESTED).fill_null(lit(UNTESTED)))
            .collect()?;

        let before = df.height();
        let df = df
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;
        report.dropped_duplicates = before - df.height();
        tracing::debug!(dropped = report.dropped_duplicates, "collapsed duplicate rows");

        let (df, dropped) = Self::retain(df, col(TOTAL_KG).is_not_null())?;
        report.dropped_missing_total = dropped;
        tracing::debug!(dropped, "removed rows without a total");

        let df = match layout {
            FourthAttempts::Present => {
                let (df, dropped) = Self::retain(df, Self::three_attempts_only())?;
                report.dropped_fourth_attempt = dropped;
                tracing::debug!(dropped, "removed rows with a 4th attempt");
                Self::drop_fourth_attempt_columns(df)?
            }
            FourthAttempts::Absent => df,
        };

        let df = Self::shrink_integers(df, &mut report)?;
        report.output_rows = df.height();

        tracing::info!(
            input = report.input_rows,
            output = report.output_rows,
            dropped = report.dropped(),
            "normalized competition records"
        );

        Ok(Normalized { table: df, report })
    }

    /// Step 1 casts: Float64 → Float32 where lossless in range, attributes →
    /// String.
    fn storage_casts(df: &DataFrame) -> Result<Vec<Expr>, DataError> {
        let mut exprs = Vec::new();
        for column in df.get_columns() {
            let name = column.name().clone();
            let dtype = column.dtype();

            if ATTRIBUTE_COLUMNS.contains(&name.as_str()) {
                if dtype != &DataType::String {
                    exprs.push(col(name).cast(DataType::String));
                }
                continue;
            }

            if dtype == &DataType::Float64 {
                if fits_f32(column.as_materialized_series())? {
                    exprs.push(col(name).cast(DataType::Float32));
                } else {
                    tracing::warn!(column = %name, "values exceed f32 range, keeping f64");
                }
            }
        }
        Ok(exprs)
    }

    fn valid_sex() -> Expr {
        col(SEX).eq(lit("M")).or(col(SEX).eq(lit("F")))
    }

    fn three_attempts_only() -> Expr {
        col(SQUAT4_KG)
            .is_null()
            .and(col(BENCH4_KG).is_null())
            .and(col(DEADLIFT4_KG).is_null())
    }

    /// Keep rows matching `predicate`; returns the frame and the drop count.
    /// A null predicate result drops the row.
    fn retain(df: DataFrame, predicate: Expr) -> Result<(DataFrame, usize), DataError> {
        let before = df.height();
        let kept = df.lazy().filter(predicate).collect()?;
        let dropped = before - kept.height();
        Ok((kept, dropped))
    }

    fn drop_fourth_attempt_columns(df: DataFrame) -> Result<DataFrame, DataError> {
        let keep: Vec<Expr> = df
            .get_columns()
            .iter()
            .map(|c| c.name().clone())
            .filter(|name| !FOURTH_ATTEMPT_COLUMNS.contains(&name.as_str()))
            .map(col)
            .collect();
        Ok(df.lazy().select(keep).collect()?)
    }

    /// Step 7. Each cast is verified to keep min, max and null count before
    /// it replaces the column.
    fn shrink_integers(
        mut df: DataFrame,
        report: &mut NormalizeReport,
    ) -> Result<DataFrame, DataError> {
        let mut shrunk = Vec::new();

        for column in df.get_columns() {
            let series = column.as_materialized_series();
            let Some(target) = minimal_integer_dtype(series)? else {
                continue;
            };
            let candidate = series.cast(&target)?;
            if round_trips(series, &candidate)? {
                shrunk.push(candidate);
            } else {
                tracing::warn!(column = %series.name(), "integer shrink would lose values, skipped");
            }
        }

        for series in shrunk {
            report
                .shrunk_columns
                .push((series.name().to_string(), series.dtype().to_string()));
            df.with_column(series)?;
        }

        Ok(df)
    }
}

/// Narrowest integer dtype holding the column's range, when narrower than the
/// current one. Unsigned when the minimum is non-negative.
fn minimal_integer_dtype(series: &Series) -> PolarsResult<Option<DataType>> {
    let current_bits = match integer_bits(series.dtype()) {
        Some(bits) => bits,
        None => return Ok(None),
    };
    let (Some(min), Some(max)) = (series.min::<i64>()?, series.max::<i64>()?) else {
        return Ok(None);
    };

    let target = if min >= 0 {
        if max <= u8::MAX as i64 {
            DataType::UInt8
        } else if max <= u16::MAX as i64 {
            DataType::UInt16
        } else if max <= u32::MAX as i64 {
            DataType::UInt32
        } else {
            DataType::UInt64
        }
    } else if min >= i8::MIN as i64 && max <= i8::MAX as i64 {
        DataType::Int8
    } else if min >= i16::MIN as i64 && max <= i16::MAX as i64 {
        DataType::Int16
    } else if min >= i32::MIN as i64 && max <= i32::MAX as i64 {
        DataType::Int32
    } else {
        DataType::Int64
    };

    match integer_bits(&target) {
        Some(bits) if bits < current_bits => Ok(Some(target)),
        _ => Ok(None),
    }
}

fn integer_bits(dtype: &DataType) -> Option<u32> {
    match dtype {
        DataType::Int8 | DataType::UInt8 => Some(8),
        DataType::Int16 | DataType::UInt16 => Some(16),
        DataType::Int32 | DataType::UInt32 => Some(32),
        DataType::Int64 | DataType::UInt64 => Some(64),
        _ => None,
    }
}

fn round_trips(original: &Series, shrunk: &Series) -> PolarsResult<bool> {
    Ok(original.null_count() == shrunk.null_count()
        && original.min::<i64>()? == shrunk.min::<i64>()?
        && original.max::<i64>()? == shrunk.max::<i64>()?)
}

fn fits_f32(series: &Series) -> PolarsResult<bool> {
    let limit = f32::MAX as f64;
    let in_range = |v: Option<f64>| v.map_or(true, |v| !v.is_finite() || v.abs() <= limit);
    Ok(in_range(series.min::<f64>()?) && in_range(series.max::<f64>()?))
}
