use polars::prelude::*;
use std::collections::HashMap;

use super::EngineError;
use crate::data::CanonicalTable;
use crate::domain::{Attribute, FilterCriteria};

/// The subset of the canonical table matching one criteria combination.
#[derive(Debug, Clone)]
pub struct FilteredView {
    df: DataFrame,
    criteria: FilterCriteria,
}

impl FilteredView {
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// No record matched. A valid state, distinct from a failure.
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }
}

/// Narrow `table` to the rows matching every constraint in `criteria`.
///
/// Matching is exact and case-sensitive. Empty criteria return the whole
/// table.
pub fn filter(table: &CanonicalTable, criteria: &FilterCriteria) -> Result<FilteredView, EngineError> {
    let predicate = criteria
        .iter()
        .map(|(attribute, value)| col(attribute.column()).eq(lit(value.to_string())))
        .reduce(|acc, expr| acc.and(expr));

    let df = match predicate {
        None => table.frame().clone(),
        Some(predicate) => table.frame().clone().lazy().filter(predicate).collect()?,
    };

    tracing::debug!(
        criteria = criteria.len(),
        rows = df.height(),
        "filtered canonical table"
    );

    Ok(FilteredView {
        df,
        criteria: criteria.clone(),
    })
}

/// Distinct non-null values of an attribute, most frequent first (ties by
/// value).
pub fn distinct_values(
    table: &CanonicalTable,
    attribute: Attribute,
) -> Result<Vec<(String, usize)>, EngineError> {
    let name = attribute.column();
    let column = table
        .frame()
        .column(name)
        .map_err(|_| EngineError::UnknownColumn(name.to_string()))?;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in column.as_materialized_series().str()?.into_iter().flatten() {
        *counts.entry(value).or_default() += 1;
    }

    let mut values: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect();
    values.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(values)
}
