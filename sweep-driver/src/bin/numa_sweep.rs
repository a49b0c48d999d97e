use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::Local;
use clap::Parser;
use sweep_driver::{config::Overrides, logging, ChildLauncher, Driver, DriverConfig};

/// Runs the NUMA TPC-H benchmark over every (iteration, core count) configuration.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
  /// TOML file with [sweep] and [paths] tables; flags below override it
  #[clap(long, short)]
  config: Option<PathBuf>,
  #[clap(long, help = "TPC-H scale factor")]
  scale: Option<f64>,
  #[clap(long, help = "Query repetitions per core")]
  runs_per_core: Option<u32>,
  #[clap(long, help = "Passes over the core count list")]
  iterations: Option<u32>,
  #[clap(long, value_delimiter = ',', help = "Core counts in execution order, e.g. 8,4,0")]
  cores: Option<Vec<u32>>,
  #[clap(long, value_delimiter = ',', help = "TPC-H query ids")]
  queries: Option<Vec<u32>>,
  #[clap(long, help = "Suffix for the run directory name")]
  label: Option<String>,
  #[clap(long, help = "Path to the benchmark executable")]
  executable: Option<PathBuf>,
  #[clap(long, help = "Base directory for run directories")]
  results_dir: Option<PathBuf>,
  /// Record unsuccessful benchmark exits in the status file (`--status-warnings=false` to disable)
  #[clap(long, num_args = 0..=1, default_missing_value = "true")]
  status_warnings: Option<bool>,
  /// Print the planned invocations without running anything
  #[clap(long)]
  dry_run: bool,
  #[clap(long, short, help = "Debug logging")]
  verbose: bool,
}

impl Args {
  fn into_config(self) -> Result<DriverConfig> {
    let mut config = match &self.config {
      Some(path) => DriverConfig::load(path)?,
      None => DriverConfig::default(),
    };
    config.apply_overrides(Overrides {
      scale: self.scale,
      runs_per_core: self.runs_per_core,
      iterations: self.iterations,
      core_counts: self.cores,
      queries: self.queries,
      label: self.label,
      executable: self.executable,
      results_dir: self.results_dir,
      status_warnings: self.status_warnings,
    });
    Ok(config)
  }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  let args = Args::parse();
  logging::init(args.verbose);
  let dry_run = args.dry_run;

  let driver = Driver::new(args.into_config()?, ChildLauncher)?;
  let started_at = Local::now().naive_local();

  if dry_run {
    return driver.write_plan(started_at, &mut std::io::stdout().lock());
  }

  tokio::select! {
    report = driver.run(started_at) => {
      let report = report?;
      if !report.failures.is_empty() {
        tracing::warn!(
          failures = report.failures.len(),
          "some benchmark runs exited unsuccessfully, check {}",
          driver.config().paths.output_file.display()
        );
      }
      Ok(())
    }
    _ = tokio::signal::ctrl_c() => {
      bail!("interrupted, sweep left incomplete");
    }
  }
}

#[cfg(test)]
mod tests {
  use clap::Parser;
  use rstest::rstest;

  use super::Args;

  #[rstest]
  #[case(&[], None)]
  #[case(&["--status-warnings"], Some(true))]
  #[case(&["--status-warnings=false"], Some(false))]
  #[case(&["--status-warnings", "--dry-run"], Some(true))]
  fn test_status_warnings_flag(#[case] flags: &[&str], #[case] expected: Option<bool>) {
    let argv = std::iter::once("numa-sweep").chain(flags.iter().copied());
    let args = Args::try_parse_from(argv).unwrap();
    assert_eq!(args.status_warnings, expected);
  }

  #[test]
  fn test_flags_override_defaults() {
    let args = Args::try_parse_from([
      "numa-sweep",
      "--runs-per-core",
      "5",
      "--cores",
      "8,4,0",
      "--status-warnings=false",
    ])
    .unwrap();
    let config = args.into_config().unwrap();
    assert_eq!(config.sweep.runs_per_core, 5);
    assert_eq!(config.sweep.core_counts, vec![8, 4, 0]);
    assert_eq!(config.sweep.scale, 0.1);
    assert!(!config.status_warnings);
  }
}
