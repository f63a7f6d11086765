use super::lift::{Lift, PerLift};
use serde::{Deserialize, Serialize};

/// Lift values entered by the user, in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserInput {
    pub squat: f64,
    pub bench: f64,
    pub deadlift: f64,
}

impl UserInput {
    pub fn new(squat: f64, bench: f64, deadlift: f64) -> Self {
        Self {
            squat,
            bench,
            deadlift,
        }
    }

    pub fn get(&self, lift: Lift) -> f64 {
        match lift {
            Lift::Squat => self.squat,
            Lift::Bench => self.bench,
            Lift::Deadlift => self.deadlift,
        }
    }

    pub fn total(&self) -> f64 {
        self.squat + self.bench + self.deadlift
    }

    pub fn as_per_lift(&self) -> PerLift<f64> {
        PerLift::from_fn(|lift| self.get(lift))
    }

    /// Lifts whose value is not a positive finite number, in priority order.
    pub fn invalid_lifts(&self) -> Vec<Lift> {
        Lift::ALL
            .into_iter()
            .filter(|lift| {
                let value = self.get(*lift);
                !(value.is_finite() && value > 0.0)
            })
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.invalid_lifts().is_empty()
    }
}
