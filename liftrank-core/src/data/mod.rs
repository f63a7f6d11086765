//! Data ingestion, normalization and snapshot persistence

pub mod ingest;
pub mod normalize;
pub mod schema;
pub mod snapshot;
pub mod table;

pub use ingest::{DataError, DataIngestor};
pub use normalize::{NormalizeReport, Normalized, Normalizer};
pub use schema::{CanonicalSchema, RawSchema, SchemaError};
pub use snapshot::{SnapshotMeta, SnapshotStore};
pub use table::{CanonicalTable, SnapshotVersion};
