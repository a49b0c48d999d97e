//! This crate provides the pure planning half of a benchmark sweep:
//! - the sweep configuration and its validation
//! - the ordered (iteration, core count) configuration matrix
//! - run directory / result file naming and the benchmark's argument list
//!
//! Nothing in here touches the filesystem or spawns processes.

pub mod invocation;
pub mod layout;

use std::collections::BTreeSet;
use std::iter::FusedIterator;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_LABEL: &str = "_cachemiss_cycleslost";

/// A [`SweepConfig`] is fixed for the lifetime of one sweep.
///
/// Every field has a default so a partial TOML table deserializes into a complete config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
  /// TPC-H scale factor handed to the benchmark
  pub scale: f64,
  /// Query repetitions per core; multiplied by the core count of each configuration
  pub runs_per_core: u32,
  /// Number of passes over the whole core count list
  pub iterations: u32,
  /// Core counts in execution order. 0 runs the benchmark with its scheduler disabled.
  pub core_counts: Vec<u32>,
  /// TPC-H query ids, passed through as one `-q` flag each
  pub queries: Vec<u32>,
  /// Appended verbatim to the run directory name, before the timestamp
  pub label: String,
}

impl Default for SweepConfig {
  fn default() -> Self {
    Self {
      scale: 0.1,
      runs_per_core: 3,
      iterations: 3,
      core_counts: default_core_counts(),
      queries: vec![1, 3, 5, 6, 7, 9, 10, 13],
      label: DEFAULT_LABEL.to_string(),
    }
  }
}

/// 80 down to 5 in steps of 5, then every count from 4 down to 0.
pub fn default_core_counts() -> Vec<u32> {
  (1..=16)
    .rev()
    .map(|step| step * 5)
    .chain([4, 3, 2, 1, 0])
    .collect()
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
  #[error("scale factor must be a positive finite number, got {0}")]
  InvalidScale(f64),
  #[error("runs per core must be at least 1")]
  ZeroRunsPerCore,
  #[error("core count {0} appears more than once; its result files would overwrite each other")]
  DuplicateCoreCount(u32),
  #[error("{runs_per_core} runs per core times {core_count} cores does not fit in a u32")]
  RunsOverflow { core_count: u32, runs_per_core: u32 },
}

impl SweepConfig {
  pub fn validate(&self) -> Result<(), ConfigError> {
    if !self.scale.is_finite() || self.scale <= 0.0 {
      return Err(ConfigError::InvalidScale(self.scale));
    }
    if self.runs_per_core == 0 {
      return Err(ConfigError::ZeroRunsPerCore);
    }

    let mut seen = BTreeSet::new();
    for &core_count in &self.core_counts {
      if !seen.insert(core_count) {
        return Err(ConfigError::DuplicateCoreCount(core_count));
      }
      if self.runs_per_core.checked_mul(core_count).is_none() {
        return Err(ConfigError::RunsOverflow {
          core_count,
          runs_per_core: self.runs_per_core,
        });
      }
    }
    Ok(())
  }

  /// Iterate the configuration matrix: iteration-major, core-count-minor, in authored order.
  /// Calling this again yields the same sequence.
  pub fn matrix(&self) -> Matrix<'_> {
    Matrix {
      core_counts: &self.core_counts,
      runs_per_core: self.runs_per_core,
      total: self.iterations as usize * self.core_counts.len(),
      next: 0,
    }
  }
}

/// One benchmark invocation worth of parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
  pub iteration: u32,
  pub core_count: u32,
  pub use_scheduler: bool,
  pub runs_per_query: u32,
}

impl Configuration {
  pub fn new(iteration: u32, core_count: u32, runs_per_core: u32) -> Self {
    Self {
      iteration,
      core_count,
      use_scheduler: core_count != 0,
      runs_per_query: runs_per_query(runs_per_core, core_count),
    }
  }
}

/// Repetitions scale with the core count, except that 0 cores keeps the base count
/// instead of collapsing it to zero.
pub fn runs_per_query(runs_per_core: u32, core_count: u32) -> u32 {
  if core_count == 0 {
    runs_per_core
  } else {
    runs_per_core.saturating_mul(core_count)
  }
}

/// Iterator over the sweep's configurations, see [`SweepConfig::matrix`].
#[derive(Debug, Clone)]
pub struct Matrix<'a> {
  core_counts: &'a [u32],
  runs_per_core: u32,
  total: usize,
  next: usize,
}

impl Iterator for Matrix<'_> {
  type Item = Configuration;

  fn next(&mut self) -> Option<Self::Item> {
    if self.next >= self.total {
      return None;
    }
    let width = self.core_counts.len();
    let iteration = (self.next / width) as u32;
    let core_count = self.core_counts[self.next % width];
    self.next += 1;
    Some(Configuration::new(iteration, core_count, self.runs_per_core))
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let remaining = self.total - self.next;
    (remaining, Some(remaining))
  }
}

impl ExactSizeIterator for Matrix<'_> {}

impl FusedIterator for Matrix<'_> {}

#[cfg(test)]
mod tests {
  use rstest::rstest;

  use crate::{default_core_counts, runs_per_query, ConfigError, Configuration, SweepConfig};

  fn config(iterations: u32, core_counts: Vec<u32>, runs_per_core: u32) -> SweepConfig {
    SweepConfig {
      iterations,
      core_counts,
      runs_per_core,
      ..SweepConfig::default()
    }
  }

  #[rstest]
  #[case(3, 1, 3)]
  #[case(3, 2, 6)]
  #[case(3, 80, 240)]
  #[case(5, 7, 35)]
  fn test_runs_scale_with_cores(#[case] runs_per_core: u32, #[case] cores: u32, #[case] expected: u32) {
    assert_eq!(runs_per_query(runs_per_core, cores), expected);
  }

  #[rstest]
  #[case(1)]
  #[case(3)]
  #[case(17)]
  fn test_zero_cores_keeps_base_runs(#[case] runs_per_core: u32) {
    assert_eq!(runs_per_query(runs_per_core, 0), runs_per_core);
    let configuration = Configuration::new(0, 0, runs_per_core);
    assert!(!configuration.use_scheduler);
    assert_eq!(configuration.runs_per_query, runs_per_core);
  }

  #[test]
  fn test_default_core_counts() {
    let counts = default_core_counts();
    assert_eq!(counts.len(), 21);
    assert_eq!(&counts[..3], &[80, 75, 70]);
    assert_eq!(&counts[15..], &[5, 4, 3, 2, 1, 0]);
  }

  #[rstest]
  #[case(1, vec![2, 0])]
  #[case(3, vec![80, 1, 40, 0, 2])]
  #[case(0, vec![4, 2])]
  #[case(4, vec![])]
  fn test_matrix_shape_and_order(#[case] iterations: u32, #[case] core_counts: Vec<u32>) {
    let sweep = config(iterations, core_counts.clone(), 3);
    let matrix = sweep.matrix();
    assert_eq!(matrix.len(), iterations as usize * core_counts.len());

    let expected: Vec<(u32, u32)> = (0..iterations)
      .flat_map(|iteration| core_counts.iter().map(move |&cores| (iteration, cores)))
      .collect();
    let actual: Vec<(u32, u32)> = matrix.map(|c| (c.iteration, c.core_count)).collect();
    assert_eq!(expected, actual);
  }

  #[test]
  fn test_matrix_is_restartable() {
    let sweep = SweepConfig::default();
    let first: Vec<_> = sweep.matrix().collect();
    let second: Vec<_> = sweep.matrix().collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 63);
    // Iteration boundary falls right after the trailing zero
    assert_eq!((first[20].iteration, first[20].core_count), (0, 0));
    assert_eq!((first[21].iteration, first[21].core_count), (1, 80));
  }

  #[test]
  fn test_matrix_derives_flags() {
    let sweep = config(1, vec![2, 0], 3);
    let configurations: Vec<_> = sweep.matrix().collect();
    assert_eq!(
      configurations,
      vec![
        Configuration {
          iteration: 0,
          core_count: 2,
          use_scheduler: true,
          runs_per_query: 6
        },
        Configuration {
          iteration: 0,
          core_count: 0,
          use_scheduler: false,
          runs_per_query: 3
        },
      ]
    );
  }

  #[test]
  fn test_validate() {
    assert_eq!(SweepConfig::default().validate(), Ok(()));

    let mut sweep = SweepConfig::default();
    sweep.scale = 0.0;
    assert_eq!(sweep.validate(), Err(ConfigError::InvalidScale(0.0)));
    sweep.scale = f64::NAN;
    assert!(matches!(sweep.validate(), Err(ConfigError::InvalidScale(_))));

    assert_eq!(config(1, vec![1], 0).validate(), Err(ConfigError::ZeroRunsPerCore));
    assert_eq!(
      config(1, vec![4, 2, 4], 3).validate(),
      Err(ConfigError::DuplicateCoreCount(4))
    );
    assert_eq!(
      config(1, vec![u32::MAX], 2).validate(),
      Err(ConfigError::RunsOverflow {
        core_count: u32::MAX,
        runs_per_core: 2
      })
    );
  }

  #[test]
  fn test_deserialize_partial_table() {
    let sweep: SweepConfig = toml::from_str("scale = 1.0\ncore_counts = [8, 0]\n").unwrap();
    assert_eq!(sweep.scale, 1.0);
    assert_eq!(sweep.core_counts, vec![8, 0]);
    assert_eq!(sweep.runs_per_core, 3);
    assert_eq!(sweep.label, crate::DEFAULT_LABEL);

    assert!(toml::from_str::<SweepConfig>("cores = [1]\n").is_err());
  }
}
