//! Line-oriented subprocess output.
//!
//! A search runs as a child process whose stdout is read one line at a time
//! as it is produced. The child handle lives inside the stream state, so
//! dropping the stream kills the process and closes the pipe.

use camino::Utf8PathBuf;
use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Split};
use tokio::process::Child;
use tracing::{debug, warn};

use crate::command::CommandSpec;
use crate::error::ScanError;
use crate::source::{CandidateStream, SourceEvent};

/// Trimmed, non-empty output lines. Ends after the first read error.
pub(crate) type LineStream = BoxStream<'static, Result<String, ScanError>>;

/// One search subprocess run as part of a scan.
#[derive(Debug, Clone)]
pub(crate) struct SearchUnit {
    pub(crate) command: CommandSpec,
    /// Narration emitted once the process has started.
    pub(crate) announcement: String,
}

struct LineReader<R> {
    child: Option<Child>,
    lines: Split<R>,
    command: String,
    done: bool,
}

/// Spawns `spec` and streams its stdout line by line.
pub(crate) fn spawn_lines(spec: &CommandSpec) -> Result<LineStream, ScanError> {
    let mut child = spec
        .command()
        .spawn()
        .map_err(|e| ScanError::spawn(spec, e))?;

    let Some(stdout) = child.stdout.take() else {
        return Err(ScanError::read(
            spec,
            std::io::Error::other("stdout was not captured"),
        ));
    };

    debug!(command = %spec, pid = ?child.id(), "Search process started");

    Ok(read_lines(
        BufReader::new(stdout),
        Some(child),
        spec.to_string(),
    ))
}

/// Streams `reader` line by line on behalf of `command`.
///
/// `child`, when given, is reaped once the output ends and killed if the
/// stream is dropped first.
fn read_lines<R>(reader: R, child: Option<Child>, command: String) -> LineStream
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let reader = LineReader {
        child,
        lines: reader.split(b'\n'),
        command,
        done: false,
    };
    stream::unfold(reader, next_line).boxed()
}

type NextLine<R> = Option<(Result<String, ScanError>, LineReader<R>)>;

async fn next_line<R>(mut reader: LineReader<R>) -> NextLine<R>
where
    R: AsyncBufRead + Unpin,
{
    if reader.done {
        return None;
    }

    loop {
        match reader.lines.next_segment().await {
            Ok(Some(bytes)) => {
                let Ok(line) = String::from_utf8(bytes) else {
                    warn!(command = %reader.command, "Skipping non-UTF-8 output line");
                    continue;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                return Some((Ok(line.to_owned()), reader));
            }
            Ok(None) => {
                if let Some(child) = reader.child.as_mut() {
                    match child.wait().await {
                        Ok(status) => {
                            debug!(command = %reader.command, %status, "Search process exited");
                        }
                        Err(e) => {
                            let command = &reader.command;
                            warn!(%command, error = %e, "Failed to reap search process");
                        }
                    }
                }
                return None;
            }
            Err(e) => {
                reader.done = true;
                let error = ScanError::read(&reader.command, e);
                return Some((Err(error), reader));
            }
        }
    }
}

/// Runs `units` one after another, yielding their output as candidates.
///
/// A unit whose process cannot be spawned yields a single error event and
/// the next unit starts. A read error ends only the unit it happened in.
pub(crate) fn run_units(units: Vec<SearchUnit>) -> CandidateStream {
    run_launched(units, |unit| {
        let lines = spawn_lines(&unit.command)?;
        Ok((unit.announcement, lines))
    })
}

/// Starts each unit with `launch` only after the previous one has ended.
fn run_launched<U, F>(units: Vec<U>, mut launch: F) -> CandidateStream
where
    U: Send + 'static,
    F: FnMut(U) -> Result<(String, LineStream), ScanError> + Send + 'static,
{
    stream::iter(units)
        .flat_map(move |unit| unit_events(launch(unit)))
        .boxed()
}

fn unit_events(launched: Result<(String, LineStream), ScanError>) -> CandidateStream {
    match launched {
        Ok((announcement, lines)) => {
            let events = lines.map(|line| match line {
                Ok(line) => SourceEvent::Path(Utf8PathBuf::from(line)),
                Err(e) => {
                    warn!(error = %e, "Search output ended early");
                    SourceEvent::Error(e.to_string())
                }
            });
            stream::once(async move { SourceEvent::Info(announcement) })
                .chain(events)
                .boxed()
        }
        Err(e) => {
            warn!(error = %e, "Search process failed to start");
            stream::once(async move { SourceEvent::Error(e.to_string()) }).boxed()
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh").args(["-c", script])
    }

    #[tokio::test]
    async fn test_lines_are_trimmed_and_blank_lines_skipped() {
        let lines: Vec<_> = spawn_lines(&sh("printf '  /a/.git \\n\\n/b/.git\\r\\n'"))
            .unwrap()
            .collect()
            .await;

        let lines: Vec<String> = lines.into_iter().map(Result::unwrap).collect();
        assert_eq!(lines, vec!["/a/.git", "/b/.git"]);
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let lines: Vec<_> = spawn_lines(&sh("printf '/a/.git\\n/b/.git'"))
            .unwrap()
            .collect()
            .await;
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn test_non_utf8_line_skipped() {
        let lines: Vec<_> = spawn_lines(&sh("printf '/ok/.git\\n\\377\\376\\n/also/.git\\n'"))
            .unwrap()
            .collect()
            .await;

        let lines: Vec<String> = lines.into_iter().map(Result::unwrap).collect();
        assert_eq!(lines, vec!["/ok/.git", "/also/.git"]);
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let result = spawn_lines(&CommandSpec::new("/nonexistent/arcs-search-tool"));
        assert!(matches!(result, Err(ScanError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_units_run_in_order() {
        let units = vec![
            SearchUnit {
                command: sh("echo /first/.git"),
                announcement: "one".to_owned(),
            },
            SearchUnit {
                command: CommandSpec::new("/nonexistent/arcs-search-tool"),
                announcement: "never".to_owned(),
            },
            SearchUnit {
                command: sh("echo /second/.git"),
                announcement: "two".to_owned(),
            },
        ];

        let events: Vec<SourceEvent> = run_units(units).collect().await;
        assert_eq!(events.len(), 5);
        assert_eq!(events[0], SourceEvent::Info("one".to_owned()));
        assert_eq!(events[1], SourceEvent::Path(Utf8PathBuf::from("/first/.git")));
        assert!(matches!(&events[2], SourceEvent::Error(msg) if msg.contains("arcs-search-tool")));
        assert_eq!(events[3], SourceEvent::Info("two".to_owned()));
        assert_eq!(events[4], SourceEvent::Path(Utf8PathBuf::from("/second/.git")));
    }

    /// Fails every read, like a pipe whose device went away.
    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::other("device lost")))
        }
    }

    fn failing_after(output: &'static [u8]) -> BufReader<impl AsyncRead + Unpin + Send> {
        BufReader::new(output.chain(FailingReader))
    }

    #[tokio::test]
    async fn test_read_error_ends_lines() {
        let lines: Vec<_> = read_lines(failing_after(b"/a/.git\n"), None, "search".to_owned())
            .collect()
            .await;

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].as_deref().unwrap(), "/a/.git");
        assert!(matches!(&lines[1], Err(ScanError::Read { command, .. }) if command == "search"));
    }

    #[tokio::test]
    async fn test_read_error_ends_only_its_unit() {
        let units = vec![("one", true), ("two", false)];
        let events: Vec<SourceEvent> = run_launched(units, |(name, fails)| {
            let lines = if fails {
                read_lines(failing_after(b"/a/.git\n"), None, name.to_owned())
            } else {
                read_lines(BufReader::new(&b"/b/.git\n"[..]), None, name.to_owned())
            };
            Ok((name.to_owned(), lines))
        })
        .collect()
        .await;

        assert_eq!(events.len(), 5);
        assert_eq!(events[0], SourceEvent::Info("one".to_owned()));
        assert_eq!(events[1], SourceEvent::Path(Utf8PathBuf::from("/a/.git")));
        assert!(matches!(&events[2], SourceEvent::Error(msg) if msg.contains("device lost")));
        assert_eq!(events[3], SourceEvent::Info("two".to_owned()));
        assert_eq!(events[4], SourceEvent::Path(Utf8PathBuf::from("/b/.git")));
    }

    #[tokio::test]
    async fn test_dropping_stream_kills_process() {
        let dir = tempfile::TempDir::new().unwrap();
        let marker = dir.path().join("survived");
        let script = format!("echo /a/.git; sleep 2; touch '{}'", marker.display());

        let mut lines = spawn_lines(&sh(&script)).unwrap();
        assert_eq!(lines.next().await.unwrap().unwrap(), "/a/.git");
        drop(lines);

        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        assert!(!marker.exists());
    }
}
