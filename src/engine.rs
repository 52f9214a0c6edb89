use crate::codegen::SESSION_END;
use crate::error::{RbResult, RimeBenchError};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Prefix tagging every committed-text line on the console's stdout.
pub const COMMIT_PREFIX: &str = "commit: ";
/// Placeholder the engine substitutes when it cannot represent committed
/// text; its presence marks a garbled line.
pub const CORRUPTION_MARKER: char = '\u{FFFD}';

/// One committed output line, prefix already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitLine {
    pub text: String,
    pub corrupted: bool,
}

impl CommitLine {
    pub fn new<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        let corrupted = text.contains(CORRUPTION_MARKER);
        Self { text, corrupted }
    }
}

/// The narrow boundary to the external engine: feed keystroke-code lines,
/// get back the committed lines in order, tagged ok/corrupted. How the real
/// process is invoked and parsed lives entirely behind this trait, so the
/// retry protocol can be exercised against a scripted double.
pub trait EngineConsole {
    /// Submit one session's code lines. The implementation owns session
    /// termination and must preserve the 1:1 positional correspondence
    /// between input line *i* and commit line *i*.
    fn submit(&self, code_lines: &[String], label: &str) -> RbResult<Vec<CommitLine>>;
}

/// Production engine: the Rime deployer plus its console simulator.
pub struct RimeConsole {
    deployer: PathBuf,
    console: PathBuf,
    schema_dir: PathBuf,
}

impl RimeConsole {
    pub fn new<P: AsRef<Path>>(engine_bin_dir: P, schema_dir: P) -> Self {
        let bin = engine_bin_dir.as_ref();
        Self {
            deployer: bin.join("rime_deployer"),
            console: bin.join("rime_api_console"),
            schema_dir: schema_dir.as_ref().to_path_buf(),
        }
    }

    /// Compile the scheme definitions. Synchronous; non-zero exit is fatal.
    pub fn deploy(&self) -> RbResult<()> {
        info!("Deploying scheme from {:?}", self.schema_dir);
        let status = Command::new(&self.deployer)
            .arg("--build")
            .current_dir(&self.schema_dir)
            .status()
            .map_err(|e| RimeBenchError::Engine {
                label: "deploy".to_string(),
                detail: format!("failed to launch deployer: {e}"),
            })?;
        if !status.success() {
            return Err(RimeBenchError::Engine {
                label: "deploy".to_string(),
                detail: format!("deployer exited with {status}"),
            });
        }
        Ok(())
    }
}

impl EngineConsole for RimeConsole {
    fn submit(&self, code_lines: &[String], label: &str) -> RbResult<Vec<CommitLine>> {
        debug!("Submitting {} code lines for '{}'", code_lines.len(), label);
        let mut child = Command::new(&self.console)
            .current_dir(&self.schema_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| RimeBenchError::Engine {
                label: label.to_string(),
                detail: format!("failed to spawn console: {e}"),
            })?;

        // Feed stdin from its own thread while draining stdout, so a console
        // that flushes commits eagerly cannot fill the pipe and stall us.
        let mut stdin = child.stdin.take().ok_or_else(|| RimeBenchError::Engine {
            label: label.to_string(),
            detail: "console stdin unavailable".to_string(),
        })?;
        let payload = {
            let mut buf = String::new();
            for line in code_lines {
                buf.push_str(line);
                buf.push('\n');
            }
            buf.push('\n');
            buf.push_str(SESSION_END);
            buf.push('\n');
            buf
        };
        let writer = std::thread::spawn(move || {
            let _ = stdin.write_all(payload.as_bytes());
            // Dropping the handle closes the pipe and ends the session.
        });

        let stdout = child.stdout.take().ok_or_else(|| RimeBenchError::Engine {
            label: label.to_string(),
            detail: "console stdout unavailable".to_string(),
        })?;
        let mut commits = Vec::new();
        for line in BufReader::new(stdout).lines() {
            let line = line?;
            if let Some(text) = line.strip_prefix(COMMIT_PREFIX) {
                commits.push(CommitLine::new(text.trim_end()));
            }
        }

        let _ = writer.join();
        let status = child.wait()?;
        if !status.success() {
            return Err(RimeBenchError::Engine {
                label: label.to_string(),
                detail: format!("console exited with {status}"),
            });
        }
        debug!("'{}': captured {} commit lines", label, commits.len());
        Ok(commits)
    }
}
