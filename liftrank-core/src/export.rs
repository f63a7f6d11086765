//! CSV export of the user's own entry.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::domain::{Attribute, FilterCriteria, UserInput};

/// One exported row. Unconstrained attributes are empty fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    #[serde(rename = "Sex")]
    pub sex: Option<String>,
    #[serde(rename = "Weight Class")]
    pub weight_class: Option<String>,
    #[serde(rename = "Modality")]
    pub equipment: Option<String>,
    #[serde(rename = "Division")]
    pub division: Option<String>,
    #[serde(rename = "Federation")]
    pub federation: Option<String>,
    #[serde(rename = "Country")]
    pub country: Option<String>,
    #[serde(rename = "Squat")]
    pub squat: f64,
    #[serde(rename = "Bench")]
    pub bench: f64,
    #[serde(rename = "Deadlift")]
    pub deadlift: f64,
    #[serde(rename = "Total")]
    pub total: f64,
}

impl ExportRecord {
    pub fn new(criteria: &FilterCriteria, input: &UserInput) -> Self {
        let value = |attribute: Attribute| criteria.get(attribute).map(str::to_string);
        Self {
            sex: value(Attribute::Sex),
            weight_class: value(Attribute::WeightClass),
            equipment: value(Attribute::Equipment),
            division: value(Attribute::Division),
            federation: value(Attribute::Federation),
            country: value(Attribute::Country),
            squat: input.squat,
            bench: input.bench,
            deadlift: input.deadlift,
            total: input.total(),
        }
    }

    /// Header line plus this row.
    pub fn to_csv_string(&self) -> Result<String, ExportError> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.serialize(self)?;
        let data = wtr
            .into_inner()
            .map_err(|e| ExportError::Flush(e.to_string()))?;
        String::from_utf8(data).map_err(|e| ExportError::Flush(e.to_string()))
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), ExportError> {
        let content = self.to_csv_string()?;
        std::fs::write(path, content).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "exported entry");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to flush CSV writer: {0}")]
    Flush(String),

    #[error("Cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
