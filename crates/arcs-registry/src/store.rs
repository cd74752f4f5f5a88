//! Durable storage for the registry.
//!
//! The registry is stored as a single JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "directories": ["/home/user/arcs"],
//!   "localArcs": ["/data/soil-study"]
//! }
//! ```
//!
//! Documents written before the `version` field existed are read as
//! version 1. Paths are written sorted so the file diffs cleanly.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RegistryError;

/// Current document format version.
pub const DOCUMENT_VERSION: u32 = 1;

const fn legacy_version() -> u32 {
    DOCUMENT_VERSION
}

/// Serialized form of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDocument {
    /// Format version. Absent in legacy documents.
    #[serde(default = "legacy_version")]
    pub version: u32,

    /// Tracked directories whose children are listed as arcs.
    #[serde(default)]
    pub directories: Vec<Utf8PathBuf>,

    /// Explicitly tracked arcs.
    #[serde(default, rename = "localArcs")]
    pub local_arcs: Vec<Utf8PathBuf>,
}

impl Default for RegistryDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            directories: Vec::new(),
            local_arcs: Vec::new(),
        }
    }
}

/// Load/persist seam for [`ArcRegistry`](crate::ArcRegistry).
pub trait RegistryStore: Send + Sync + std::fmt::Debug {
    /// Reads the stored document, or `None` if nothing has been stored yet.
    fn load(&self) -> Result<Option<RegistryDocument>, RegistryError>;

    /// Replaces the stored document.
    fn save(&self, document: &RegistryDocument) -> Result<(), RegistryError>;
}

/// Stores the registry as a pretty-printed JSON file.
///
/// Saves write a sibling temporary file and rename it over the target, so a
/// crash mid-write never leaves a truncated document behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileStore {
    path: Utf8PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the document path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn temp_path(&self) -> Utf8PathBuf {
        let file_name = self.path.file_name().unwrap_or("registry.json");
        self.path.with_file_name(format!(".{file_name}.tmp"))
    }
}

impl RegistryStore for JsonFileStore {
    fn load(&self) -> Result<Option<RegistryDocument>, RegistryError> {
        let contents = match fs::read_to_string(self.path.as_std_path()) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path, "Registry file does not exist yet");
                return Ok(None);
            }
            Err(e) => return Err(RegistryError::io(&self.path, e)),
        };

        let document: RegistryDocument = serde_json::from_str(&contents)
            .map_err(|e| RegistryError::parse(&self.path, e))?;

        if document.version > DOCUMENT_VERSION {
            return Err(RegistryError::UnsupportedVersion {
                path: self.path.clone(),
                version: document.version,
            });
        }

        Ok(Some(document))
    }

    fn save(&self, document: &RegistryDocument) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_str().is_empty() {
                fs::create_dir_all(parent.as_std_path())
                    .map_err(|e| RegistryError::io(parent, e))?;
            }
        }

        let mut json = serde_json::to_string_pretty(document)
            .map_err(|e| RegistryError::parse(&self.path, e))?;
        json.push('\n');

        let temp = self.temp_path();
        fs::write(temp.as_std_path(), json).map_err(|e| RegistryError::io(&temp, e))?;
        fs::rename(temp.as_std_path(), self.path.as_std_path())
            .map_err(|e| RegistryError::io(&self.path, e))?;

        debug!(
            path = %self.path,
            directories = document.directories.len(),
            arcs = document.local_arcs.len(),
            "Registry saved"
        );
        Ok(())
    }
}
