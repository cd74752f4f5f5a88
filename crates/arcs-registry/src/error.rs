//! Error types for the arcs-registry crate.
//!
//! Registry errors are never swallowed: a mutation whose persist step fails
//! is rolled back and the error is returned to the caller.

use camino::Utf8PathBuf;

/// Errors that can occur while reading, mutating, or persisting the registry.
///
/// # Examples
///
/// ```
/// use arcs_registry::RegistryError;
/// use camino::Utf8PathBuf;
///
/// fn handle_error(err: RegistryError) {
///     match err {
///         RegistryError::Io { path, .. } => eprintln!("cannot access {path}"),
///         RegistryError::Parse { path, .. } => eprintln!("corrupt registry {path}"),
///         RegistryError::UnsupportedVersion { version, .. } => eprintln!("version {version}"),
///         RegistryError::RelativePath(p) => eprintln!("not absolute: {p}"),
///         RegistryError::NonUtf8Path(p) => eprintln!("invalid path: {}", p.display()),
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The registry document could not be read or written.
    #[error("failed to access registry file {path}: {source}")]
    Io {
        /// The registry document path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The registry document is not valid JSON or has the wrong shape.
    #[error("failed to parse registry file {path}: {source}")]
    Parse {
        /// The registry document path.
        path: Utf8PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The registry document was written by a newer format version.
    #[error("registry file {path} has unsupported version {version}")]
    UnsupportedVersion {
        /// The registry document path.
        path: Utf8PathBuf,
        /// The version found in the document.
        version: u32,
    },

    /// Only absolute paths may be tracked.
    #[error("path is not absolute: {0}")]
    RelativePath(Utf8PathBuf),

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl RegistryError {
    /// Creates a new [`RegistryError::Io`] error.
    #[inline]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`RegistryError::Parse`] error.
    #[inline]
    pub fn parse(path: impl Into<Utf8PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if the error comes from caller input rather than storage.
    ///
    /// Input errors leave both the in-memory and persisted state untouched
    /// and can be fixed by retrying with a different argument.
    #[inline]
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::RelativePath(_) | Self::NonUtf8Path(_))
    }

    /// Returns the registry file path associated with this error, if any.
    #[must_use]
    pub fn file(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Io { path, .. }
            | Self::Parse { path, .. }
            | Self::UnsupportedVersion { path, .. } => Some(path),
            Self::RelativePath(_) | Self::NonUtf8Path(_) => None,
        }
    }
}
