//! Region transformer: delegates region content to an external formatter.
//!
//! The pipeline is generic over [`RegionFormatter`] so tests can substitute
//! deterministic formatters. The production implementation,
//! [`CommandFormatter`], pipes region text through an external process
//! (prettier by default) and surfaces its stderr on failure. Invocations
//! make no assumption about latency or completion order; timeouts are
//! enforced by the coordinator so every implementation gets the same
//! discipline.

use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::LitfmtError;

/// Default formatter command line.
pub const DEFAULT_FORMATTER: &str = "prettier --parser typescript";

/// Failure of a single region's formatter invocation.
///
/// Kept separate from [`LitfmtError`] so the coordinator can attach the
/// region index and offsets when it reports the failure.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("failed to spawn formatter '{program}': {message}")]
    Spawn { program: String, message: String },

    #[error("formatter i/o error: {0}")]
    Io(String),

    #[error("formatter exited with status {status}: {stderr}")]
    NonZeroExit { status: i32, stderr: String },

    #[error("formatter produced non-UTF-8 output")]
    InvalidOutput,

    #[error("formatter exited successfully without reading its full input: {0}")]
    InputNotConsumed(String),

    #[error("formatter timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Formats the raw inner content of one region.
///
/// Implementations must be independent per call: the coordinator issues all
/// invocations concurrently and correlates results by region index alone.
#[async_trait]
pub trait RegionFormatter: Send + Sync {
    async fn format_region(&self, raw: &str) -> Result<String, FormatError>;
}

/// Formatter that pipes region text through an external command.
///
/// The region content is written to the child's stdin; its stdout becomes
/// the transformed text. A non-zero exit fails the region with the child's
/// stderr attached.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        CommandFormatter {
            program: program.into(),
            args,
        }
    }

    /// Build from a whitespace-separated command line, e.g.
    /// `"prettier --parser typescript"`.
    pub fn from_command_line(line: &str) -> Result<Self, LitfmtError> {
        let mut words = line.split_whitespace();
        let Some(program) = words.next() else {
            return Err(LitfmtError::invalid_args("empty formatter command"));
        };
        Ok(CommandFormatter {
            program: program.to_string(),
            args: words.map(str::to_string).collect(),
        })
    }

    /// The program this formatter runs, for logging.
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl RegionFormatter for CommandFormatter {
    async fn format_region(&self, raw: &str) -> Result<String, FormatError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| FormatError::Spawn {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| FormatError::Io("child stdin not captured".to_string()))?;
        // A failing formatter may exit before draining stdin, so a broken
        // pipe here is deferred rather than returned: if the child then
        // reports failure, its exit status is the better error, but a child
        // that exits cleanly without reading its input would silently
        // truncate the region.
        let write_result = stdin.write_all(raw.as_bytes()).await;
        // Close stdin so the formatter sees EOF.
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| FormatError::Io(e.to_string()))?;

        if !output.status.success() {
            return Err(FormatError::NonZeroExit {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if let Err(e) = write_result {
            return Err(FormatError::InputNotConsumed(e.to_string()));
        }

        String::from_utf8(output.stdout).map_err(|_| FormatError::InvalidOutput)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod command_line_parsing {
        use super::*;

        #[test]
        fn splits_program_and_args() {
            let formatter =
                CommandFormatter::from_command_line("prettier --parser typescript").unwrap();
            assert_eq!(formatter.program(), "prettier");
            assert_eq!(formatter.args, vec!["--parser", "typescript"]);
        }

        #[test]
        fn bare_program_has_no_args() {
            let formatter = CommandFormatter::from_command_line("dprint").unwrap();
            assert_eq!(formatter.program(), "dprint");
            assert!(formatter.args.is_empty());
        }

        #[test]
        fn empty_command_is_rejected() {
            let err = CommandFormatter::from_command_line("   ").expect_err("should reject");
            assert!(matches!(err, LitfmtError::InvalidArguments { .. }));
        }
    }

    #[cfg(unix)]
    mod process_invocation {
        use super::*;

        #[tokio::test]
        async fn cat_round_trips_content() {
            let formatter = CommandFormatter::new("cat", vec![]);
            let out = formatter.format_region("<x/>\n").await.unwrap();
            assert_eq!(out, "<x/>\n");
        }

        #[tokio::test]
        async fn missing_program_is_a_spawn_error() {
            let formatter = CommandFormatter::new("litfmt-no-such-program", vec![]);
            let err = formatter.format_region("x").await.expect_err("should fail");
            assert!(matches!(err, FormatError::Spawn { .. }));
        }

        #[tokio::test]
        async fn clean_exit_without_draining_stdin_is_an_error() {
            // Large enough to overflow the pipe buffer, so the write fails
            // once the child stops reading instead of queueing silently.
            let formatter = CommandFormatter::new("head", vec!["-c".into(), "2".into()]);
            let raw = "<x/>".repeat(256 * 1024);
            let err = formatter.format_region(&raw).await.expect_err("should fail");
            assert!(matches!(err, FormatError::InputNotConsumed(_)));
        }

        #[tokio::test]
        async fn nonzero_exit_carries_status() {
            let formatter = CommandFormatter::new("false", vec![]);
            let err = formatter.format_region("x").await.expect_err("should fail");
            match err {
                FormatError::NonZeroExit { status, .. } => assert_eq!(status, 1),
                other => panic!("expected NonZeroExit, got {other:?}"),
            }
        }
    }
}
