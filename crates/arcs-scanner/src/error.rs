//! Error types for the arcs-scanner crate.
//!
//! Scan errors never escape a scan. They are rendered into
//! [`ScanEvent::Error`](arcs_core::ScanEvent::Error) messages and the scan
//! continues with the next unit of work.

/// Errors that can occur while running a search subprocess.
///
/// # Error Recovery Strategy
///
/// - **Spawn errors** ([`ScanError::Spawn`]): skip this search, continue with the next drive
/// - **Read errors** ([`ScanError::Read`]): end this search, keep what was collected
/// - **Drive errors** ([`ScanError::DriveQuery`], [`ScanError::NoDrives`]): nothing to search
///
/// # Examples
///
/// ```
/// use arcs_scanner::ScanError;
///
/// fn handle_error(err: ScanError) {
///     match err {
///         ScanError::Spawn { command, .. } => eprintln!("could not start {command}"),
///         ScanError::Read { command, .. } => eprintln!("lost output of {command}"),
///         ScanError::DriveQuery { command, reason } => eprintln!("{command}: {reason}"),
///         ScanError::NoDrives => eprintln!("no drives"),
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The search subprocess could not be started.
    #[error("Failed to start command {command}: {source}")]
    Spawn {
        /// The command line that failed.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Reading the subprocess output failed mid-scan.
    #[error("Error reading output of {command}: {source}")]
    Read {
        /// The command line whose output was being read.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The drive enumeration command failed.
    #[error("Failed to enumerate drives with {command}: {reason}")]
    DriveQuery {
        /// The drive enumeration command line.
        command: String,
        /// Why the enumeration failed.
        reason: String,
    },

    /// Drive enumeration succeeded but listed no drives.
    #[error("No drives found to search")]
    NoDrives,
}

impl ScanError {
    /// Creates a new [`ScanError::Spawn`] error.
    #[inline]
    pub fn spawn(command: impl ToString, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.to_string(),
            source,
        }
    }

    /// Creates a new [`ScanError::Read`] error.
    #[inline]
    pub fn read(command: impl ToString, source: std::io::Error) -> Self {
        Self::Read {
            command: command.to_string(),
            source,
        }
    }

    /// Creates a new [`ScanError::DriveQuery`] error.
    #[inline]
    pub fn drive_query(command: impl ToString, reason: impl Into<String>) -> Self {
        Self::DriveQuery {
            command: command.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the scan can continue with other work after this error.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Spawn { .. } | Self::Read { .. })
    }

    /// Returns `true` if the strategy has nothing left to search.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }
}
