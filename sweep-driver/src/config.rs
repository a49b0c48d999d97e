//! Startup configuration: a TOML file with `[sweep]` and `[paths]` tables, every key optional.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use sweep_core::SweepConfig;

/// Where the driver reads from and writes to. Relative paths resolve against the
/// driver's working directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepPaths {
  /// Base directory; each sweep creates one run directory inside it
  pub results_dir: PathBuf,
  pub executable: PathBuf,
  /// Progress log for external monitors, reset per sweep
  pub status_file: PathBuf,
  /// Combined stdout/stderr of every benchmark process, reset per sweep
  pub output_file: PathBuf,
  /// Written once at the very end with the run directory path
  pub name_file: PathBuf,
}

impl Default for SweepPaths {
  fn default() -> Self {
    Self {
      results_dir: PathBuf::from("results"),
      executable: PathBuf::from("build-release/numaBenchmarkTPCH"),
      status_file: PathBuf::from("current_run.status"),
      output_file: PathBuf::from("current_run.out"),
      name_file: PathBuf::from("current_run.name"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
  pub sweep: SweepConfig,
  pub paths: SweepPaths,
  /// Also record non-zero benchmark exits in the status file
  pub status_warnings: bool,
}

impl DriverConfig {
  pub fn from_toml(text: &str) -> Result<Self> {
    Ok(toml::from_str(text)?)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
      .with_context(|| format!("failed to read config file {}", path.display()))?;
    Self::from_toml(&text).with_context(|| format!("invalid config file {}", path.display()))
  }

  /// Apply command-line values on top of the file (or default) values.
  pub fn apply_overrides(&mut self, overrides: Overrides) {
    let sweep = &mut self.sweep;
    if let Some(scale) = overrides.scale {
      sweep.scale = scale;
    }
    if let Some(runs_per_core) = overrides.runs_per_core {
      sweep.runs_per_core = runs_per_core;
    }
    if let Some(iterations) = overrides.iterations {
      sweep.iterations = iterations;
    }
    if let Some(core_counts) = overrides.core_counts {
      sweep.core_counts = core_counts;
    }
    if let Some(queries) = overrides.queries {
      sweep.queries = queries;
    }
    if let Some(label) = overrides.label {
      sweep.label = label;
    }
    if let Some(executable) = overrides.executable {
      self.paths.executable = executable;
    }
    if let Some(results_dir) = overrides.results_dir {
      self.paths.results_dir = results_dir;
    }
    if let Some(status_warnings) = overrides.status_warnings {
      self.status_warnings = status_warnings;
    }
  }
}

/// Values given on the command line. `None` keeps whatever the config file says.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
  pub scale: Option<f64>,
  pub runs_per_core: Option<u32>,
  pub iterations: Option<u32>,
  pub core_counts: Option<Vec<u32>>,
  pub queries: Option<Vec<u32>>,
  pub label: Option<String>,
  pub executable: Option<PathBuf>,
  pub results_dir: Option<PathBuf>,
  pub status_warnings: Option<bool>,
}
