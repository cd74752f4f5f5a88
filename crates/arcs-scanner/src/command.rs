//! External command descriptions.

use std::fmt;
use std::process::Stdio;

use tokio::process::Command;

/// A program and its arguments.
///
/// Search strategies describe their subprocesses with `CommandSpec` so the
/// programs can be swapped out (for example in tests).
///
/// # Examples
///
/// ```
/// use arcs_scanner::CommandSpec;
///
/// let spec = CommandSpec::new("find").args(["/", "-xdev", "-name", ".git"]);
/// assert_eq!(spec.to_string(), "find / -xdev -name .git");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    /// Creates a command with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Returns the program name.
    #[inline]
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the arguments.
    #[inline]
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Builds a subprocess whose stdout is piped.
    ///
    /// Stdin and stderr are discarded. The child is killed when its handle
    /// is dropped, so abandoning a scan never leaves the search running.
    pub(crate) fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_args() {
        assert_eq!(CommandSpec::new("wmic").to_string(), "wmic");
    }

    #[test]
    fn test_builder() {
        let spec = CommandSpec::new("cmd.exe")
            .args(["/c", "dir", "/s", "/b"])
            .arg(r"C:\.git");
        assert_eq!(spec.program(), "cmd.exe");
        assert_eq!(spec.arguments().len(), 5);
        assert_eq!(spec.to_string(), r"cmd.exe /c dir /s /b C:\.git");
    }
}
