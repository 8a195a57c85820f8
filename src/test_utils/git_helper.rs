//! Git fixture helper.
//!
//! Builds real repositories on disk with the system git so tests can fetch from them over
//! `file://` URIs.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs git commands inside a fixture repository.
pub struct TestGit {
    repo_path: PathBuf,
}

impl TestGit {
    fn run_git_command(&self, args: &[&str], action: &str) -> Result<std::process::Output> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .with_context(|| action.to_string())?;

        if !output.status.success() {
            bail!("{} failed: {}", action, String::from_utf8_lossy(&output.stderr));
        }

        Ok(output)
    }

    /// Wraps the repository at `repo_path`.
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    /// Creates the directory, runs `git init` on a `master` branch and configures a user.
    pub fn create(repo_path: impl Into<PathBuf>) -> Result<Self> {
        let git = Self::new(repo_path);
        std::fs::create_dir_all(&git.repo_path)?;
        git.run_git_command(&["init", "-q"], "Failed to initialize git repository")?;
        git.run_git_command(
            &["symbolic-ref", "HEAD", "refs/heads/master"],
            "Failed to set default branch",
        )?;
        git.run_git_command(
            &["config", "user.email", "test@gopm.example"],
            "Failed to configure git user email",
        )?;
        git.run_git_command(&["config", "user.name", "Test User"], "Failed to configure git user name")?;
        git.run_git_command(&["config", "commit.gpgsign", "false"], "Failed to disable signing")?;
        Ok(git)
    }

    /// The repository directory.
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// `file://` URI of the repository.
    pub fn uri(&self) -> String {
        format!("file://{}", self.repo_path.display())
    }

    /// Writes `content` to `relative_path`, creating parent directories.
    pub fn write_file(&self, relative_path: &str, content: &str) -> Result<()> {
        let path = self.repo_path.join(relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Stages everything and commits; returns the new commit hash.
    pub fn commit_all(&self, message: &str) -> Result<String> {
        self.run_git_command(&["add", "."], "Failed to add files to git")?;
        self.run_git_command(&["commit", "-q", "-m", message], "Failed to create git commit")?;
        self.rev_parse_head()
    }

    /// Creates a lightweight tag at `HEAD`.
    pub fn tag(&self, tag_name: &str) -> Result<()> {
        self.run_git_command(&["tag", tag_name], &format!("Failed to create tag: {tag_name}"))?;
        Ok(())
    }

    /// Creates a branch at `HEAD` without switching to it.
    pub fn branch(&self, branch_name: &str) -> Result<()> {
        self.run_git_command(&["branch", branch_name], &format!("Failed to create branch: {branch_name}"))?;
        Ok(())
    }

    /// Current commit hash.
    pub fn rev_parse_head(&self) -> Result<String> {
        let output = self.run_git_command(&["rev-parse", "HEAD"], "Failed to get current commit SHA")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
