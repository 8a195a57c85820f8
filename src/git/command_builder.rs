//! Fluent builder for git subprocesses.
//!
//! Every git invocation in gopm goes through [`GitCommand`], which gives consistent logging,
//! timeouts, non-interactive execution and error mapping into [`GopmError`].

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::GopmError;
use crate::utils::platform::get_git_command;

/// Builder for a single git command.
///
/// Output is always captured. Defaults: 5 minute timeout, no working directory (the process
/// directory), `GIT_TERMINAL_PROMPT=0` so credential prompts fail instead of hanging.
///
/// ```rust,no_run
/// use gopm::git::command_builder::GitCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let refs = GitCommand::ls_remote("https://github.com/pkg/errors.git")
///     .with_context("Listing refs")
///     .execute_stdout()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct GitCommand {
    /// Command arguments passed to git
    args: Vec<String>,

    /// Directory passed as `-C <dir>`
    current_dir: Option<PathBuf>,

    /// Extra environment for the git process
    env_vars: Vec<(String, String)>,

    /// Maximum duration to wait for completion (None = no timeout)
    timeout_duration: Option<Duration>,

    /// Optional label used in log lines
    context: Option<String>,

    /// Remote involved, reported on fetch failures
    remote_url: Option<String>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            env_vars: vec![("GIT_TERMINAL_PROMPT".to_string(), "0".to_string())],
            timeout_duration: Some(Duration::from_secs(300)),
            context: None,
            remote_url: None,
        }
    }
}

impl GitCommand {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs git in `dir` (as `git -C <dir> ...`).
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets an environment variable for the git process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Overrides the timeout; `None` waits forever.
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Label prefixed to log lines of this command.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Arguments after the `-C <dir>` prefix.
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Executes the command and returns its captured output.
    ///
    /// Non-zero exit maps to [`GopmError::FetchFailed`] for fetches and
    /// [`GopmError::GitCommandError`] otherwise; a missing git binary maps to
    /// [`GopmError::GitNotFound`].
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let start = std::time::Instant::now();
        let git_command = get_git_command();
        let mut cmd = Command::new(git_command);

        let mut full_args = Vec::new();
        if let Some(ref dir) = self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.iter().cloned());
        cmd.args(&full_args);

        let label = self.context.as_deref().map(|ctx| format!("({ctx}) ")).unwrap_or_default();
        tracing::debug!(target: "git", "{label}Executing command: {git_command} {}", full_args.join(" "));

        for (key, value) in &self.env_vars {
            tracing::trace!(target: "git", "Setting env var: {key}={value}");
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let operation = self.args.first().cloned().unwrap_or_else(|| "unknown".to_string());

        let output_future = cmd.output();
        let output = if let Some(duration) = self.timeout_duration {
            match timeout(duration, output_future).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        target: "git",
                        "Command timed out after {} seconds: git {}",
                        duration.as_secs(),
                        full_args.join(" ")
                    );
                    return Err(GopmError::GitCommandError {
                        operation,
                        stderr: format!(
                            "Git command timed out after {} seconds. The remote may be unreachable \
                            or waiting for credentials. Try running: git {}",
                            duration.as_secs(),
                            full_args.join(" ")
                        ),
                    }
                    .into());
                }
            }
        } else {
            output_future.await
        };

        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GopmError::GitNotFound.into());
            }
            Err(e) => {
                return Err(e).context(format!("Failed to execute git {}", full_args.join(" ")));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(target: "git", "{label}Command failed with exit code: {:?}", output.status.code());
            if !stderr.is_empty() {
                tracing::debug!(target: "git", "{label}Error: {}", stderr.trim());
            }

            let reason = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            let error = match (operation.as_str(), self.remote_url) {
                ("fetch" | "ls-remote", Some(uri)) => GopmError::FetchFailed {
                    uri,
                    reason,
                },
                _ => GopmError::GitCommandError {
                    operation,
                    stderr: reason,
                },
            };
            return Err(error.into());
        }

        if !stdout.is_empty() {
            tracing::trace!(target: "git", "{label}{}", stdout.trim());
        }
        if !stderr.is_empty() {
            tracing::debug!(target: "git", "{label}{}", stderr.trim());
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(target: "git::perf", "{label}Git {operation} took {:.2}s", elapsed.as_secs_f64());
        } else if elapsed.as_millis() > 100 {
            tracing::debug!(target: "git::perf", "{label}Git {operation} took {}ms", elapsed.as_millis());
        }

        Ok(GitCommandOutput {
            stdout,
            stderr,
        })
    }

    /// Executes and returns trimmed stdout.
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Executes and discards output.
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }
}

/// Captured output of a git command.
#[derive(Debug)]
pub struct GitCommandOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

// Builders for the operations gopm performs

impl GitCommand {
    /// `git ls-remote <url>`: every ref the remote advertises.
    pub fn ls_remote(url: &str) -> Self {
        let mut cmd = Self::new().args(["ls-remote", url]);
        cmd.remote_url = Some(url.to_string());
        cmd
    }

    /// `git init -q`
    pub fn init() -> Self {
        Self::new().args(["init", "-q"])
    }

    /// `git fetch --depth 1 <url> <ref>`: shallow fetch of a single ref into `FETCH_HEAD`.
    pub fn fetch_shallow(url: &str, ref_name: &str) -> Self {
        let mut cmd = Self::new().args(["fetch", "-q", "--depth", "1", url, ref_name]);
        cmd.remote_url = Some(url.to_string());
        cmd
    }

    /// `git checkout -q <ref>`
    pub fn checkout(ref_name: &str) -> Self {
        Self::new().args(["checkout", "-q", ref_name])
    }

    /// `git rev-parse HEAD`
    pub fn current_commit() -> Self {
        Self::new().args(["rev-parse", "HEAD"])
    }

    /// `git --version`
    pub fn version() -> Self {
        Self::new().arg("--version")
    }
}
