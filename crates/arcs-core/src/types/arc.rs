//! Tracked arc records.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// A tracked arc directory.
///
/// The `name` is derived from the final path segment when the record is
/// built and is not re-derived if the directory is later renamed. The update
/// timestamps start empty; they are filled in by repository metadata readers
/// outside of this workspace.
///
/// # Examples
///
/// ```
/// use arcs_core::LocalArc;
/// use camino::Utf8Path;
///
/// let arc = LocalArc::new(Utf8Path::new("/projects/soil-study"));
/// assert_eq!(arc.name, "soil-study");
/// assert!(arc.local_last_update.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalArc {
    /// Absolute path of the arc directory. Identity key.
    pub location: Utf8PathBuf,

    /// Display label.
    pub name: String,

    /// Last local modification, if known.
    #[serde(default)]
    pub local_last_update: Option<String>,

    /// Last remote update, if known.
    #[serde(default)]
    pub remote_last_update: Option<String>,
}

impl LocalArc {
    /// Creates a record for the arc at `location`.
    ///
    /// A location without a final segment (such as `/`) uses the whole path
    /// as its name.
    #[must_use]
    pub fn new(location: &Utf8Path) -> Self {
        let name = location
            .file_name()
            .map_or_else(|| location.to_string(), ToOwned::to_owned);

        Self {
            location: location.to_owned(),
            name,
            local_last_update: None,
            remote_last_update: None,
        }
    }
}
