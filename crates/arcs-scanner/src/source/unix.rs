//! `find`-based search.

use camino::Utf8PathBuf;

use super::{CandidateSource, CandidateStream};
use crate::command::CommandSpec;
use crate::process::{SearchUnit, run_units};

/// Searches for `.git` entries with a single `find` process.
///
/// The search does not descend into `.git` directories it has matched and,
/// unless a full scan is requested, stays on the filesystem of the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnixSource {
    program: String,
    root: Utf8PathBuf,
}

impl Default for UnixSource {
    fn default() -> Self {
        Self::new("/")
    }
}

impl UnixSource {
    /// Creates a source searching from `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            program: "find".to_owned(),
            root: root.into(),
        }
    }

    /// Replaces the search program. It receives `find`-compatible arguments.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Returns the search root.
    #[must_use]
    pub fn root(&self) -> &camino::Utf8Path {
        &self.root
    }

    /// The search command for the given mode.
    #[must_use]
    pub fn command(&self, full_scan: bool) -> CommandSpec {
        let spec = CommandSpec::new(self.program.as_str()).arg(self.root.as_str());
        let spec = if full_scan { spec } else { spec.arg("-xdev") };
        spec.args(["-name", ".git", "-prune"])
    }
}

impl CandidateSource for UnixSource {
    fn candidates(&self, full_scan: bool) -> CandidateStream {
        let command = self.command(full_scan);
        let announcement = format!("Searching for .git directories with command: {command}");
        run_units(vec![SearchUnit {
            command,
            announcement,
        }])
    }
}
