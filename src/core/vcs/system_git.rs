//! System git backend
//!
//! Release trains are read at a branch or tag without touching the checkout:
//! refs are resolved with `rev-parse` and files are read with `git show`.

use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use crate::utils::path_to_git_format;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository, `None` if `path` is not inside one
  pub fn open(path: &Path) -> ReleaseResult<Option<Self>> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Ok(None);
      }
      return Err(ReleaseError::message(format!(
        "Failed to open git repository at {}: {}",
        path.display(),
        stderr.trim()
      )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(Some(Self {
      repo_path: path.to_path_buf(),
      work_tree: PathBuf::from(stdout.trim()),
    }))
  }

  /// Resolve a branch or tag to a commit
  ///
  /// Local refs are tried first, then `origin/<name>`.
  pub fn resolve_ref(&self, name: &str) -> ReleaseResult<Option<String>> {
    for candidate in [name.to_string(), format!("origin/{}", name)] {
      let output = self
        .git_cmd()
        .args(["rev-parse", "--verify", "--quiet"])
        .arg(format!("{}^{{commit}}", candidate))
        .output()
        .context("Failed to execute git rev-parse --verify")?;

      if output.status.success() {
        return Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()));
      }
    }
    Ok(None)
  }

  /// Read a file at a specific commit
  ///
  /// `path` is relative to the directory the repository was opened at.
  /// Returns `None` if the file doesn't exist at that commit.
  pub fn read_file_at(&self, commit: &str, path: &Path) -> ReleaseResult<Option<String>> {
    let relative = self
      .repo_path
      .canonicalize()
      .ok()
      .and_then(|repo| {
        let root = self.work_tree.canonicalize().ok()?;
        repo.strip_prefix(&root).ok().map(|p| p.join(path))
      })
      .unwrap_or_else(|| path.to_path_buf());
    let spec = format!("{}:{}", commit, path_to_git_format(&relative));

    let output = self
      .git_cmd()
      .args(["show", &spec])
      .output()
      .context("Failed to read file from commit")?;

    if !output.status.success() {
      tracing::debug!("git show {} failed: {}", spec, String::from_utf8_lossy(&output.stderr).trim());
      return Ok(None);
    }

    Ok(Some(String::from_utf8(output.stdout)?))
  }

  /// Create a git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("core.quotePath=false");

    cmd
  }
}
