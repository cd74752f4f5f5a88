//! Drive enumeration followed by per-drive `dir` searches.

use futures_util::future;
use futures_util::stream::{self, StreamExt};
use tracing::{info, warn};

use super::{CandidateSource, CandidateStream, SourceEvent};
use crate::command::CommandSpec;
use crate::error::ScanError;
use crate::process::{SearchUnit, run_units};

/// Searches every drive for `.git` entries, one drive at a time.
///
/// The drive list comes from `wmic`. Without a full scan only local hard
/// drives (`DriveType=3`) are listed. Each drive is then searched with
/// `cmd.exe /c dir /s /b <drive>\.git`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowsSource {
    local_drives: CommandSpec,
    all_drives: CommandSpec,
    search: CommandSpec,
}

impl Default for WindowsSource {
    fn default() -> Self {
        Self {
            local_drives: CommandSpec::new("wmic").args([
                "logicaldisk",
                "where",
                "DriveType=3",
                "get",
                "name",
            ]),
            all_drives: CommandSpec::new("wmic").args(["logicaldisk", "get", "name"]),
            search: CommandSpec::new("cmd.exe").args(["/c", "dir", "/s", "/b"]),
        }
    }
}

impl WindowsSource {
    /// Replaces the drive enumeration commands.
    ///
    /// Both must print one drive name per line. Blank lines and a `Name`
    /// header are ignored.
    #[must_use]
    pub fn with_drive_queries(mut self, local: CommandSpec, all: CommandSpec) -> Self {
        self.local_drives = local;
        self.all_drives = all;
        self
    }

    /// Replaces the per-drive search command. The `<drive>\.git` pattern is
    /// appended as its last argument.
    #[must_use]
    pub fn with_search(mut self, search: CommandSpec) -> Self {
        self.search = search;
        self
    }

    /// The drive enumeration command for the given mode.
    #[must_use]
    pub fn drive_query(&self, full_scan: bool) -> &CommandSpec {
        if full_scan {
            &self.all_drives
        } else {
            &self.local_drives
        }
    }

    fn search_unit(&self, drive: &str) -> SearchUnit {
        let command = self.search.clone().arg(format!(r"{drive}\.git"));
        let announcement = format!("Searching in drive: {drive}\nCommand: {command}");
        SearchUnit {
            command,
            announcement,
        }
    }
}

impl CandidateSource for WindowsSource {
    fn candidates(&self, full_scan: bool) -> CandidateStream {
        let query = self.drive_query(full_scan).clone();
        let source = self.clone();
        let announcement = SourceEvent::Info(format!("Searching for drives with command: {query}"));

        let searches = stream::once(async move { query_drives(&query).await }).flat_map(
            move |drives| match drives {
                Ok(drives) => {
                    info!(count = drives.len(), drives = ?drives, "Drives found");
                    let units = drives.iter().map(|drive| source.search_unit(drive)).collect();
                    run_units(units)
                }
                Err(e) => {
                    warn!(error = %e, "Drive enumeration failed");
                    stream::once(future::ready(SourceEvent::Error(e.to_string()))).boxed()
                }
            },
        );

        stream::once(future::ready(announcement))
            .chain(searches)
            .boxed()
    }
}

async fn query_drives(query: &CommandSpec) -> Result<Vec<String>, ScanError> {
    let output = query
        .command()
        .output()
        .await
        .map_err(|e| ScanError::spawn(query, e))?;

    if !output.status.success() {
        return Err(ScanError::drive_query(
            query,
            format!("exited with {}", output.status),
        ));
    }

    let drives = parse_drive_list(&decode_output(&output.stdout));
    if drives.is_empty() {
        return Err(ScanError::NoDrives);
    }
    Ok(drives)
}

/// `wmic` writes UTF-16 with a byte order mark when redirected on some hosts.
fn decode_output(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&[0xFF, 0xFE]) {
        Some(rest) => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Extracts drive names from drive enumeration output.
///
/// # Examples
///
/// ```
/// use arcs_scanner::parse_drive_list;
///
/// let output = "Name  \r\r\nC:    \r\r\nD:    \r\r\n\r\r\n";
/// assert_eq!(parse_drive_list(output), vec!["C:", "D:"]);
/// ```
#[must_use]
pub fn parse_drive_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.eq_ignore_ascii_case("name"))
        .map(ToOwned::to_owned)
        .collect()
}
