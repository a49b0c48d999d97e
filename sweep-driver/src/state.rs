//! The statically named files shared with external observers: status log, output log and
//! name marker. Unlike the run directory they are reused by every sweep, so each sweep
//! starts by clearing them.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;

use crate::config::SweepPaths;

/// Remove the status, output and name files left by a previous sweep. Missing files are fine.
pub async fn reset_state(paths: &SweepPaths) -> Result<()> {
  for path in [&paths.status_file, &paths.output_file, &paths.name_file] {
    remove_if_exists(path).await?;
  }
  Ok(())
}

async fn remove_if_exists(path: &Path) -> Result<()> {
  match tokio::fs::remove_file(path).await {
    Ok(()) => {
      tracing::debug!(path = %path.display(), "removed stale file");
      Ok(())
    }
    Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e).with_context(|| format!("failed to remove {}", path.display())),
  }
}

/// Append-only progress log. The file is reopened for every line so a monitor tailing it
/// always sees complete lines.
#[derive(Debug, Clone, Copy)]
pub struct StatusLog<'a> {
  path: &'a Path,
}

impl<'a> StatusLog<'a> {
  pub fn new(path: &'a Path) -> Self {
    Self { path }
  }

  pub async fn running(&self, iteration: u32, core_count: u32) -> Result<()> {
    self
      .append(&format!(
        "Running iteration {iteration}, core count {core_count}...\n"
      ))
      .await
  }

  pub async fn warning(
    &self,
    iteration: u32,
    core_count: u32,
    status: impl std::fmt::Display,
  ) -> Result<()> {
    self
      .append(&format!(
        "Warning: iteration {iteration}, core count {core_count} exited with status {status}\n"
      ))
      .await
  }

  pub async fn done(&self) -> Result<()> {
    self.append("Done\n").await
  }

  async fn append(&self, line: &str) -> Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
      .create(true)
      .append(true)
      .open(self.path)
      .await
      .with_context(|| format!("failed to open status file {}", self.path.display()))?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await?;
    Ok(())
  }
}

/// Signal completion: overwrite the name file with the run directory path and a newline.
pub async fn write_name_marker(name_file: &Path, run_dir: &Path) -> Result<()> {
  let mut contents = run_dir.as_os_str().as_encoded_bytes().to_vec();
  contents.push(b'\n');
  tokio::fs::write(name_file, contents)
    .await
    .with_context(|| format!("failed to write name file {}", name_file.display()))
}
