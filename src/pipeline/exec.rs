//! Run one external tool with an argument list and a timeout.
//!
//! Every stage of the pipeline ends up here. The child is spawned through
//! `tokio::process` with `kill_on_drop(true)`, so when
//! [`tokio::time::timeout`] gives up on it the process is killed rather than
//! left running in the background. stdout and stderr are captured and joined
//! (stdout first) for diagnostics.

use crate::error::{Doc2PagesError, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info};

/// A fully described tool invocation.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Duration,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Short tool name used in errors (`mutool`, not `/opt/mupdf/bin/mutool`).
    pub fn tool_name(&self) -> String {
        tool_name(&self.program)
    }

    /// Arguments rendered for logs.
    pub fn display_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Run the tool, returning its combined output on a zero exit status.
    ///
    /// `action` names the operation in log lines ("convert to pdf by soffice").
    pub async fn run(&self, action: &str) -> Result<String> {
        let args = self.display_args();
        info!(cmd = %self.program.display(), ?args, "{}", action);

        let result = self.run_inner().await;
        if let Err(ref e) = result {
            error!(cmd = %self.program.display(), ?args, error = %e, "{}", action);
        }
        result
    }

    async fn run_inner(&self) -> Result<String> {
        let tool = self.tool_name();
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Doc2PagesError::ToolNotFound {
                        tool: tool.clone(),
                        path: self.program.clone(),
                    }
                } else {
                    Doc2PagesError::ToolSpawn {
                        tool: tool.clone(),
                        source: e,
                    }
                }
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(res) => res.map_err(|e| Doc2PagesError::ToolSpawn {
                tool: tool.clone(),
                source: e,
            })?,
            Err(_) => {
                return Err(Doc2PagesError::ToolTimeout {
                    tool,
                    secs: self.timeout.as_secs(),
                })
            }
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        debug!("{} exited with {}, {} bytes of output", tool, output.status, combined.len());

        if output.status.success() {
            Ok(combined)
        } else {
            Err(Doc2PagesError::ToolFailed {
                tool,
                status: output.status.code(),
                output: combined.trim().to_string(),
            })
        }
    }
}

pub(crate) fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .unwrap_or(program.as_os_str())
        .to_string_lossy()
        .into_owned()
}
