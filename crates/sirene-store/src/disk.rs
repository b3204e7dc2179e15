//! Filesystem store with four fixed category buckets.
//!
//! Each save is independent: the category directory is created if absent,
//! the file is written once, and an existing file of the same name is
//! overwritten without warning. Callers needing versioning vary the
//! filename; callers writing concurrently partition filenames themselves.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;

use sirene_core::Settings;

use crate::StoreError;

/// One of the four fixed persistence buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Raw,
    Processed,
    Metadata,
    Logs,
}

impl Category {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Raw => "raw",
            Category::Processed => "processed",
            Category::Metadata => "metadata",
            Category::Logs => "logs",
        }
    }

    pub const ALL: [Category; 4] = [
        Category::Raw,
        Category::Processed,
        Category::Metadata,
        Category::Logs,
    ];
}

/// Serialization format for an artifact. Parsed from caller strings at
/// the boundary (e.g. a CLI flag); anything but `json`/`csv` is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
}

impl FromStr for Format {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Format::Json),
            "csv" => Ok(Format::Csv),
            other => Err(StoreError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// A payload ready to persist: a JSON value, or tabular rows whose first
/// row is the header. The variant fixes the on-disk format.
#[derive(Debug, Clone)]
pub enum Artifact {
    Json(serde_json::Value),
    Rows(Vec<Vec<String>>),
}

impl Artifact {
    pub fn format(&self) -> Format {
        match self {
            Artifact::Json(_) => Format::Json,
            Artifact::Rows(_) => Format::Csv,
        }
    }
}

/// Store rooted at the configured data directory, one subdirectory per
/// [`Category`]. Holds no cross-call state.
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(settings: &Settings) -> Self {
        Self {
            root: settings.data_dir.clone(),
        }
    }

    /// Create all four category directories. Idempotent; `save` also
    /// creates its target directory on demand, so calling this is
    /// optional.
    pub fn ensure_layout(&self) -> Result<(), StoreError> {
        for category in Category::ALL {
            fs::create_dir_all(self.root.join(category.dir_name()))?;
        }
        Ok(())
    }

    /// Path an artifact with this filename and category would land at.
    pub fn path_for(&self, filename: &str, category: Category) -> PathBuf {
        self.root.join(category.dir_name()).join(filename)
    }

    /// Write an artifact into its category bucket, returning the path
    /// written. Overwrites silently on filename collision.
    pub fn save(
        &self,
        artifact: &Artifact,
        filename: &str,
        category: Category,
    ) -> Result<PathBuf, StoreError> {
        let dir = self.root.join(category.dir_name());
        fs::create_dir_all(&dir)?;
        let path = dir.join(filename);

        match artifact {
            Artifact::Json(value) => write_json(&path, value)?,
            Artifact::Rows(rows) => write_rows(&path, rows)?,
        }

        info!(path = %path.display(), "saved artifact");
        Ok(path)
    }
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<(), StoreError> {
    let file = File::create(path)?;
    serde_json::to_writer(file, value)?;
    Ok(())
}

fn write_rows(path: &Path, rows: &[Vec<String>]) -> Result<(), StoreError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
