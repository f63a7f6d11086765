//! Canonical snapshot persistence.
//!
//! Layout: `{path}` (Parquet) plus `{stem}.meta.json` beside it.
//!
//! - Atomic writes: snapshot and sidecar each go to .tmp, then rename
//! - The BLAKE3 hash of the Parquet bytes is the snapshot version
//! - Load recomputes the hash and checks it against the sidecar
//! - Schema validation on load

use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::data::ingest::DataError;
use crate::data::normalize::NormalizeReport;
use crate::data::schema::CanonicalSchema;
use crate::data::table::{encode_parquet, CanonicalTable, SnapshotVersion};

/// Metadata sidecar for a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub row_count: usize,
    pub columns: Vec<String>,
    pub data_hash: SnapshotVersion,
    pub source: Option<String>,
    pub created_at: NaiveDateTime,
    pub report: Option<NormalizeReport>,
}

/// Reads and writes the canonical snapshot at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the metadata sidecar.
    pub fn meta_path(&self) -> PathBuf {
        self.path.with_extension("meta.json")
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write a canonical table. Temp files are removed if any step fails, and
    /// the sidecar on disk never carries the hash of a different file.
    pub fn write(
        &self,
        table: &DataFrame,
        source: Option<&Path>,
        report: Option<&NormalizeReport>,
    ) -> Result<SnapshotMeta, DataError> {
        CanonicalSchema::validate(table)?;

        let bytes = encode_parquet(table)?;
        let meta = SnapshotMeta {
            row_count: table.height(),
            columns: table
                .get_columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            data_hash: SnapshotVersion::from_bytes(&bytes),
            source: source.map(|p| p.display().to_string()),
            created_at: chrono::Local::now().naive_local(),
            report: report.cloned(),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(parent, e))?;
        }

        let meta_json = serde_json::to_string_pretty(&meta)?;
        let meta_path = self.meta_path();
        let tmp_path = self.path.with_extension("parquet.tmp");
        let meta_tmp_path = self.path.with_extension("meta.json.tmp");
        let discard_tmps = || {
            let _ = fs::remove_file(&tmp_path);
            let _ = fs::remove_file(&meta_tmp_path);
        };

        fs::write(&tmp_path, &bytes).map_err(|e| {
            discard_tmps();
            self.io_error(&tmp_path, e)
        })?;
        fs::write(&meta_tmp_path, meta_json).map_err(|e| {
            discard_tmps();
            self.io_error(&meta_tmp_path, e)
        })?;

        // The old sidecar goes first so it never describes the new file.
        match fs::remove_file(&meta_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                discard_tmps();
                return Err(self.io_error(&meta_path, e));
            }
        }
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            discard_tmps();
            self.io_error(&self.path, e)
        })?;
        fs::rename(&meta_tmp_path, &meta_path).map_err(|e| {
            discard_tmps();
            self.io_error(&meta_path, e)
        })?;

        tracing::info!(
            path = %self.path.display(),
            rows = meta.row_count,
            version = %meta.data_hash,
            "wrote canonical snapshot"
        );
        Ok(meta)
    }

    /// Load and validate the snapshot.
    pub fn load(&self) -> Result<CanonicalTable, DataError> {
        let bytes = fs::read(&self.path).map_err(|e| DataError::Unreadable {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        let version = SnapshotVersion::from_bytes(&bytes);

        if let Some(meta) = self.meta()? {
            if meta.data_hash != version {
                return Err(DataError::IntegrityMismatch {
                    expected: meta.data_hash.to_string(),
                    actual: version.to_string(),
                });
            }
        }

        let df = ParquetReader::new(Cursor::new(bytes)).finish()?;
        let table = CanonicalTable::new(df, version)?;

        tracing::info!(
            path = %self.path.display(),
            rows = table.height(),
            version = %table.version(),
            "loaded canonical snapshot"
        );
        Ok(table)
    }

    /// Read the sidecar, if one was written.
    pub fn meta(&self) -> Result<Option<SnapshotMeta>, DataError> {
        let meta_path = self.meta_path();
        if !meta_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&meta_path).map_err(|e| self.io_error(&meta_path, e))?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> DataError {
        DataError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
