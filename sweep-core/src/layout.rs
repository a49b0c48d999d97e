//! Naming rules for the run directory and the per-configuration result files.

use chrono::NaiveDateTime;

use crate::{Configuration, SweepConfig};

/// Second resolution; two sweeps started in different seconds get different directories.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Render a scale factor the same way in directory names and on the command line.
/// Integral values keep one decimal so `1.0` does not turn into `1`.
pub fn format_scale(scale: f64) -> String {
  if scale.is_finite() && scale.fract() == 0.0 {
    format!("{scale:.1}")
  } else {
    format!("{scale}")
  }
}

impl SweepConfig {
  /// `tpch_scale<SCALE>_runspercore<REPS><label>_<timestamp>`
  pub fn run_dir_name(&self, started_at: NaiveDateTime) -> String {
    format!(
      "tpch_scale{}_runspercore{}{}_{}",
      format_scale(self.scale),
      self.runs_per_core,
      self.label,
      started_at.format(TIMESTAMP_FORMAT)
    )
  }
}

pub fn result_file_name(configuration: &Configuration) -> String {
  format!(
    "{}cores-{}.json",
    configuration.core_count, configuration.iteration
  )
}
