use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::ingest::DataError;
use crate::data::schema::CanonicalSchema;

/// Content hash identifying one canonical snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotVersion(String);

impl SnapshotVersion {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The cleaned, immutable table every query runs against.
#[derive(Debug, Clone)]
pub struct CanonicalTable {
    df: DataFrame,
    version: SnapshotVersion,
}

impl CanonicalTable {
    /// Wrap a frame whose version is already known (e.g. hashed from disk).
    pub fn new(df: DataFrame, version: SnapshotVersion) -> Result<Self, DataError> {
        CanonicalSchema::validate(&df)?;
        Ok(Self { df, version })
    }

    /// Wrap an in-memory frame, versioning it by its Parquet encoding.
    pub fn from_frame(df: DataFrame) -> Result<Self, DataError> {
        CanonicalSchema::validate(&df)?;
        let bytes = encode_parquet(&df)?;
        let version = SnapshotVersion::from_bytes(&bytes);
        Ok(Self { df, version })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn version(&self) -> &SnapshotVersion {
        &self.version
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }
}

/// Encode a frame as Parquet in memory.
pub(crate) fn encode_parquet(df: &DataFrame) -> Result<Vec<u8>, DataError> {
    let mut buf = Vec::new();
    ParquetWriter::new(&mut buf).finish(&mut df.clone())?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ingest::DataIngestor;
    use crate::data::normalize::Normalizer;
    use crate::domain::RawRecord;

    fn canonical(records: &[RawRecord]) -> DataFrame {
        Normalizer::normalize(DataIngestor::from_records(records).unwrap())
            .unwrap()
            .table
    }

    #[test]
    fn version_is_deterministic() {
        let records = [RawRecord::full_power("M", 200.0, 140.0, 250.0)];
        let a = CanonicalTable::from_frame(canonical(&records)).unwrap();
        let b = CanonicalTable::from_frame(canonical(&records)).unwrap();
        assert_eq!(a.version(), b.version());
        assert_eq!(a.version().as_str().len(), 64);
    }

    #[test]
    fn version_tracks_content() {
        let a = CanonicalTable::from_frame(canonical(&[RawRecord::full_power("M", 200.0, 140.0, 250.0)]))
            .unwrap();
        let b = CanonicalTable::from_frame(canonical(&[RawRecord::full_power("M", 201.0, 140.0, 250.0)]))
            .unwrap();
        assert_ne!(a.version(), b.version());
    }

    #[test]
    fn raw_frame_is_not_canonical() {
        let raw = DataIngestor::from_records(&[RawRecord::full_power("M", 200.0, 140.0, 250.0)]).unwrap();
        assert!(CanonicalTable::from_frame(raw).is_err());
    }
}
