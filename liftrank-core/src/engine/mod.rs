//! Query engines over the canonical table.
//!
//! - `filter`: criteria → filtered view
//! - `percentile`: strictly-below percentile rank of a value
//! - `distribution`: lazy uniform histogram buckets
//! - `compare`: group quantile threshold and weakest/strongest lift

pub mod compare;
pub mod distribution;
pub mod filter;
pub mod percentile;

pub use compare::{compare_to_group, quantile, weakest_and_strongest, GroupComparison, LiftExtremes, Standing};
pub use distribution::{distribution, Bucket, Buckets, Distribution};
pub use filter::{distinct_values, filter, FilteredView};
pub use percentile::percentile;

use polars::prelude::*;

/// Default share of the group a total must beat to count as `Above`.
pub const DEFAULT_GROUP_PERCENTILE: f64 = 0.9;

/// Default histogram resolution.
pub const DEFAULT_BUCKET_COUNT: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Column {column} is not numeric (found {dtype})")]
    NotNumeric { column: String, dtype: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Non-null values of a numeric column, widened to f64.
pub(crate) fn observed_values(df: &DataFrame, column: &str) -> Result<Vec<f64>, EngineError> {
    let column_ref = df
        .column(column)
        .map_err(|_| EngineError::UnknownColumn(column.to_string()))?;
    let dtype = column_ref.dtype();
    if !(dtype.is_integer() || dtype.is_float()) {
        return Err(EngineError::NotNumeric {
            column: column.to_string(),
            dtype: dtype.to_string(),
        });
    }

    let widened = column_ref
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(widened.f64()?.into_iter().flatten().collect())
}

/// `value` at the precision `column` stores, so a value equal to a stored
/// one compares equal to it. Float32 columns round through `f32`.
pub(crate) fn in_stored_precision(df: &DataFrame, column: &str, value: f64) -> Result<f64, EngineError> {
    let column_ref = df
        .column(column)
        .map_err(|_| EngineError::UnknownColumn(column.to_string()))?;
    Ok(match column_ref.dtype() {
        DataType::Float32 => value as f32 as f64,
        _ => value,
    })
}
