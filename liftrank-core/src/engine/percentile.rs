use super::{in_stored_precision, observed_values, EngineError, FilteredView};
use crate::domain::Outcome;

/// Percentile rank of `value` in `column` of `view`.
///
/// 100 × (records whose value is strictly below `value`) / (records in the
/// view). Ties are not below; null values count as records but never as
/// below. An empty view has no percentile.
///
/// `value` is compared at the column's stored precision, so a lift equal to
/// a stored Float32 lift is a tie.
pub fn percentile(view: &FilteredView, column: &str, value: f64) -> Result<Outcome<f64>, EngineError> {
    if !value.is_finite() {
        return Err(EngineError::InvalidArgument(format!(
            "percentile of non-finite value {value}"
        )));
    }

    let values = observed_values(view.frame(), column)?;
    if view.is_empty() {
        return Ok(Outcome::InsufficientData);
    }

    let value = in_stored_precision(view.frame(), column, value)?;
    let below = values.iter().filter(|v| **v < value).count();
    Ok(Outcome::Ready(below as f64 / view.height() as f64 * 100.0))
}
