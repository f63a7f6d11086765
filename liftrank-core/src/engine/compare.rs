use serde::{Deserialize, Serialize};

use super::{in_stored_precision, observed_values, EngineError, FilteredView};
use crate::data::schema::TOTAL_KG;
use crate::domain::{Lift, Outcome, PerLift};

/// Where a total sits relative to the group threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Standing {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupComparison {
    pub standing: Standing,
    /// The `group_percentile` quantile of the view's totals.
    pub threshold: f64,
    pub group_percentile: f64,
}

/// Quantile `q` in `[0, 1]` of sorted values, linearly interpolated between
/// order statistics at rank `q * (n - 1)`.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n == 1 {
        return Some(sorted[0]);
    }
    let rank = q * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Classify `total` against the `group_percentile` quantile of the view's
/// totals: `Above` only when strictly greater than the threshold. `total` is
/// compared at the precision the totals are stored in.
pub fn compare_to_group(
    view: &FilteredView,
    total: f64,
    group_percentile: f64,
) -> Result<Outcome<GroupComparison>, EngineError> {
    if !(0.0..=1.0).contains(&group_percentile) {
        return Err(EngineError::InvalidArgument(format!(
            "group percentile must be in [0, 1], got {group_percentile}"
        )));
    }

    let mut totals = observed_values(view.frame(), TOTAL_KG)?;
    totals.sort_by(|a, b| a.total_cmp(b));

    let Some(threshold) = quantile(&totals, group_percentile) else {
        return Ok(Outcome::InsufficientData);
    };

    let total = in_stored_precision(view.frame(), TOTAL_KG, total)?;
    let standing = if total > threshold {
        Standing::Above
    } else {
        Standing::Below
    };
    Ok(Outcome::Ready(GroupComparison {
        standing,
        threshold,
        group_percentile,
    }))
}

/// Lifts with the lowest and highest percentile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiftExtremes {
    pub weakest: Lift,
    pub strongest: Lift,
}

/// Pick the weakest and strongest lift. Percentiles are compared as shown,
/// rounded to two decimals; on a tie the first lift in the order squat,
/// bench, deadlift wins.
pub fn weakest_and_strongest(percentiles: &PerLift<f64>) -> LiftExtremes {
    let rounded = PerLift::from_fn(|lift| round_percentile(*percentiles.get(lift)));
    let mut weakest = (Lift::Squat, rounded.squat);
    let mut strongest = weakest;

    for (lift, &value) in rounded.iter().skip(1) {
        if value < weakest.1 {
            weakest = (lift, value);
        }
        if value > strongest.1 {
            strongest = (lift, value);
        }
    }

    LiftExtremes {
        weakest: weakest.0,
        strongest: strongest.0,
    }
}

fn round_percentile(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CanonicalTable, DataIngestor, Normalizer};
    use crate::domain::{FilterCriteria, RawRecord};
    use crate::engine::filter;

    fn totals(values: &[f64]) -> FilteredView {
        let records: Vec<RawRecord> = values
            .iter()
            .enumerate()
            .map(|(i, total)| {
                let mut r = RawRecord::full_power("M", 100.0 + i as f64, 100.0, 100.0);
                r.total_kg = Some(*total);
                r
            })
            .collect();
        let raw = DataIngestor::from_records(&records).unwrap();
        let table = CanonicalTable::from_frame(Normalizer::normalize(raw).unwrap().table).unwrap();
        filter(&table, &FilterCriteria::new()).unwrap()
    }

    #[test]
    fn total_equal_to_decimal_threshold_is_below() {
        // 300.3 is not exact in f32
        let view = totals(&[300.3, 300.3, 300.3]);
        let comparison = compare_to_group(&view, 300.3, 0.9).unwrap().ready().unwrap();
        assert_eq!(comparison.standing, Standing::Below);

        let comparison = compare_to_group(&view, 300.31, 0.9).unwrap().ready().unwrap();
        assert_eq!(comparison.standing, Standing::Above);
    }

    #[test]
    fn group_percentile_out_of_range_is_invalid() {
        let view = totals(&[300.0]);
        assert!(matches!(
            compare_to_group(&view, 300.0, 1.5),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    fn per_lift(squat: f64, bench: f64, deadlift: f64) -> PerLift<f64> {
        PerLift {
            squat,
            bench,
            deadlift,
        }
    }

    #[test]
    fn quantile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 0.5), Some(3.0));
        assert_eq!(quantile(&values, 1.0), Some(5.0));
        // rank 0.9 * 4 = 3.6 → 4 + 0.6
        assert!((quantile(&values, 0.9).unwrap() - 4.6).abs() < 1e-12);
    }

    #[test]
    fn quantile_of_ten() {
        let values: Vec<f64> = (0..10).map(|i| 100.0 + 10.0 * i as f64).collect();
        // rank 8.1 → 180 + 0.1 * 10
        assert!((quantile(&values, 0.9).unwrap() - 181.0).abs() < 1e-9);
    }

    #[test]
    fn quantile_edge_cases() {
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[7.0], 0.9), Some(7.0));
    }

    #[test]
    fn tie_for_weakest_prefers_squat() {
        let extremes = weakest_and_strongest(&per_lift(50.0, 50.0, 80.0));
        assert_eq!(extremes.weakest, Lift::Squat);
        assert_eq!(extremes.strongest, Lift::Deadlift);
    }

    #[test]
    fn tie_for_strongest_prefers_bench_over_deadlift() {
        let extremes = weakest_and_strongest(&per_lift(10.0, 90.0, 90.0));
        assert_eq!(extremes.weakest, Lift::Squat);
        assert_eq!(extremes.strongest, Lift::Bench);
    }

    #[test]
    fn percentiles_equal_at_two_decimals_tie() {
        let extremes = weakest_and_strongest(&per_lift(33.334, 33.331, 90.0));
        assert_eq!(extremes.weakest, Lift::Squat);

        let extremes = weakest_and_strongest(&per_lift(10.0, 66.661, 66.664));
        assert_eq!(extremes.strongest, Lift::Bench);
    }

    #[test]
    fn all_equal_is_squat_both_ways() {
        let extremes = weakest_and_strongest(&per_lift(42.0, 42.0, 42.0));
        assert_eq!(extremes.weakest, Lift::Squat);
        assert_eq!(extremes.strongest, Lift::Squat);
    }

    #[test]
    fn distinct_values() {
        let extremes = weakest_and_strongest(&per_lift(70.0, 20.0, 95.0));
        assert_eq!(extremes.weakest, Lift::Bench);
        assert_eq!(extremes.strongest, Lift::Deadlift);
    }
}
