use serde::{Deserialize, Serialize};

/// One competition entry as it appears in a raw export.
///
/// Mirrors the required raw columns; any further columns of a real export
/// only exist in the frame read from disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Sex")]
    pub sex: Option<String>,
    #[serde(rename = "Equipment")]
    pub equipment: Option<String>,
    #[serde(rename = "Division")]
    pub division: Option<String>,
    #[serde(rename = "Federation")]
    pub federation: Option<String>,
    #[serde(rename = "MeetCountry")]
    pub meet_country: Option<String>,
    #[serde(rename = "WeightClassKg")]
    pub weight_class_kg: Option<String>,
    #[serde(rename = "Best3SquatKg")]
    pub best3_squat_kg: Option<f64>,
    #[serde(rename = "Best3BenchKg")]
    pub best3_bench_kg: Option<f64>,
    #[serde(rename = "Best3DeadliftKg")]
    pub best3_deadlift_kg: Option<f64>,
    #[serde(rename = "TotalKg")]
    pub total_kg: Option<f64>,
    #[serde(rename = "Squat4Kg")]
    pub squat4_kg: Option<f64>,
    #[serde(rename = "Bench4Kg")]
    pub bench4_kg: Option<f64>,
    #[serde(rename = "Deadlift4Kg")]
    pub deadlift4_kg: Option<f64>,
    #[serde(rename = "Tested")]
    pub tested: Option<String>,
}

impl RawRecord {
    /// A full-power entry with the three best lifts and a matching total.
    pub fn full_power(sex: &str, squat: f64, bench: f64, deadlift: f64) -> Self {
        Self {
            sex: Some(sex.to_string()),
            equipment: Some("Raw".to_string()),
            division: Some("Open".to_string()),
            federation: Some("IPF".to_string()),
            meet_country: Some("USA".to_string()),
            weight_class_kg: Some("93".to_string()),
            best3_squat_kg: Some(squat),
            best3_bench_kg: Some(bench),
            best3_deadlift_kg: Some(deadlift),
            total_kg: Some(squat + bench + deadlift),
            tested: Some("Yes".to_string()),
            ..Self::default()
        }
    }
}
