use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sweep_core::{layout::result_file_name, Configuration, SweepConfig};

/// Directory holding every result file of one sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
  pub run_dir: PathBuf,
}

impl RunLayout {
  pub fn new(results_dir: &Path, sweep: &SweepConfig, started_at: NaiveDateTime) -> Self {
    Self {
      run_dir: results_dir.join(sweep.run_dir_name(started_at)),
    }
  }

  pub fn result_file(&self, configuration: &Configuration) -> PathBuf {
    self.run_dir.join(result_file_name(configuration))
  }

  /// Create the base and run directories. Existing directories and their contents are
  /// left untouched.
  pub async fn create(&self) -> Result<()> {
    tokio::fs::create_dir_all(&self.run_dir)
      .await
      .with_context(|| format!("failed to create run directory {}", self.run_dir.display()))
  }
}

/// Compute the run directory for a sweep started at `started_at` and make sure it exists.
pub async fn plan_layout(
  results_dir: &Path,
  sweep: &SweepConfig,
  started_at: NaiveDateTime,
) -> Result<RunLayout> {
  let layout = RunLayout::new(results_dir, sweep, started_at);
  layout.create().await?;
  Ok(layout)
}
