use crate::data::schema::{BEST3_BENCH_KG, BEST3_DEADLIFT_KG, BEST3_SQUAT_KG};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three competition lifts.
///
/// Declaration order is also the tie-break priority used when picking the
/// weakest/strongest lift: squat, then bench, then deadlift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lift {
    Squat,
    Bench,
    Deadlift,
}

impl Lift {
    /// All lifts in priority order.
    pub const ALL: [Lift; 3] = [Lift::Squat, Lift::Bench, Lift::Deadlift];

    /// Canonical-table column holding the best successful attempt.
    pub fn column(self) -> &'static str {
        match self {
            Lift::Squat => BEST3_SQUAT_KG,
            Lift::Bench => BEST3_BENCH_KG,
            Lift::Deadlift => BEST3_DEADLIFT_KG,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Lift::Squat => "squat",
            Lift::Bench => "bench",
            Lift::Deadlift => "deadlift",
        }
    }
}

impl fmt::Display for Lift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A value per lift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerLift<T> {
    pub squat: T,
    pub bench: T,
    pub deadlift: T,
}

impl<T> PerLift<T> {
    pub fn from_fn(mut f: impl FnMut(Lift) -> T) -> Self {
        Self {
            squat: f(Lift::Squat),
            bench: f(Lift::Bench),
            deadlift: f(Lift::Deadlift),
        }
    }

    pub fn try_from_fn<E>(mut f: impl FnMut(Lift) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            squat: f(Lift::Squat)?,
            bench: f(Lift::Bench)?,
            deadlift: f(Lift::Deadlift)?,
        })
    }

    pub fn get(&self, lift: Lift) -> &T {
        match lift {
            Lift::Squat => &self.squat,
            Lift::Bench => &self.bench,
            Lift::Deadlift => &self.deadlift,
        }
    }

    /// Iterate in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Lift, &T)> + '_ {
        Lift::ALL.into_iter().map(move |lift| (lift, self.get(lift)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_is_squat_bench_deadlift() {
        assert_eq!(Lift::ALL, [Lift::Squat, Lift::Bench, Lift::Deadlift]);
        assert!(Lift::Squat < Lift::Bench && Lift::Bench < Lift::Deadlift);
    }

    #[test]
    fn per_lift_iterates_in_priority_order() {
        let values = PerLift::from_fn(|lift| lift.column());
        let lifts: Vec<Lift> = values.iter().map(|(lift, _)| lift).collect();
        assert_eq!(lifts, Lift::ALL.to_vec());
        assert_eq!(*values.get(Lift::Bench), BEST3_BENCH_KG);
    }
}
