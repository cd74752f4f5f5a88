//! Arc classification.
//!
//! An arc is a directory that directly contains a marker file. This module
//! provides [`ArcClassifier`], the single predicate every other component
//! uses to decide whether a path is an arc.

use camino::Utf8Path;

/// Marker file whose presence identifies a directory as an arc.
pub const DEFAULT_MARKER_FILE: &str = "isa.investigation.xlsx";

/// Decides whether a directory is an arc.
///
/// Classification never fails: a path that does not exist, is not a
/// directory, or cannot be inspected simply classifies as "not an arc".
///
/// # Examples
///
/// ```
/// use arcs_core::ArcClassifier;
/// use camino::Utf8Path;
///
/// let classifier = ArcClassifier::default();
/// assert!(!classifier.is_arc(Utf8Path::new("/nonexistent/path")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArcClassifier {
    marker_file: String,
}

impl ArcClassifier {
    /// Creates a classifier that looks for the given marker file name.
    #[must_use]
    pub fn new(marker_file: impl Into<String>) -> Self {
        Self {
            marker_file: marker_file.into(),
        }
    }

    /// Returns the marker file name this classifier looks for.
    #[inline]
    #[must_use]
    pub fn marker_file(&self) -> &str {
        &self.marker_file
    }

    /// Returns `true` if `path` is an existing directory that directly
    /// contains the marker file.
    #[must_use]
    pub fn is_arc(&self, path: &Utf8Path) -> bool {
        path.is_dir() && path.join(&self.marker_file).is_file()
    }
}

impl Default for ArcClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_FILE)
    }
}
