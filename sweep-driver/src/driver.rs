use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sweep_core::{invocation::benchmark_args, Configuration};

use crate::{
  config::DriverConfig,
  layout::{plan_layout, RunLayout},
  process::{ExitOutcome, Invocation, Launcher},
  state::{reset_state, write_name_marker, StatusLog},
};

/// A configuration whose benchmark process exited unsuccessfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
  pub configuration: Configuration,
  pub outcome: ExitOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
  pub run_dir: PathBuf,
  /// Number of benchmark processes run to completion
  pub runs: usize,
  pub failures: Vec<Failure>,
}

/// Runs the whole configuration matrix, one benchmark process at a time.
pub struct Driver<L> {
  config: DriverConfig,
  launcher: L,
  working_dir: PathBuf,
}

impl<L: Launcher> Driver<L> {
  /// Validates the configuration; benchmark processes inherit the current working directory.
  pub fn new(config: DriverConfig, launcher: L) -> Result<Self> {
    config.sweep.validate()?;
    let working_dir = std::env::current_dir().context("failed to resolve working directory")?;
    Ok(Self {
      config,
      launcher,
      working_dir,
    })
  }

  pub fn config(&self) -> &DriverConfig {
    &self.config
  }

  pub fn launcher(&self) -> &L {
    &self.launcher
  }

  pub fn layout(&self, started_at: NaiveDateTime) -> RunLayout {
    RunLayout::new(&self.config.paths.results_dir, &self.config.sweep, started_at)
  }

  /// Every configuration paired with the invocation that runs it, in execution order.
  pub fn plan<'a>(
    &'a self,
    layout: &'a RunLayout,
  ) -> impl Iterator<Item = (Configuration, Invocation)> + 'a {
    self.config.sweep.matrix().map(move |configuration| {
      let result_file = layout.result_file(&configuration);
      let invocation = Invocation {
        program: self.config.paths.executable.clone(),
        args: benchmark_args(&self.config.sweep, &configuration, &result_file),
        working_dir: self.working_dir.clone(),
      };
      (configuration, invocation)
    })
  }

  /// Print every planned invocation, one per line, without touching the filesystem.
  pub fn write_plan(&self, started_at: NaiveDateTime, out: &mut impl Write) -> Result<()> {
    let layout = self.layout(started_at);
    for (_, invocation) in self.plan(&layout) {
      writeln!(out, "{invocation}")?;
    }
    Ok(())
  }

  /// Execute the sweep. Returns once every configuration has run, the status log
  /// ends with `Done` and the name file points at the run directory.
  ///
  /// Errors (filesystem failures, a benchmark that cannot be started) abort the sweep
  /// before the name file is written.
  pub async fn run(&self, started_at: NaiveDateTime) -> Result<SweepReport> {
    let paths = &self.config.paths;
    let layout = plan_layout(&paths.results_dir, &self.config.sweep, started_at).await?;
    tracing::info!(run_dir = %layout.run_dir.display(), "created run directory");

    reset_state(paths).await?;
    let status = StatusLog::new(&paths.status_file);

    let total = self.config.sweep.matrix().len();
    let mut report = SweepReport {
      run_dir: layout.run_dir.clone(),
      runs: 0,
      failures: Vec::new(),
    };

    for (index, (configuration, invocation)) in self.plan(&layout).enumerate() {
      let Configuration {
        iteration,
        core_count,
        ..
      } = configuration;
      status.running(iteration, core_count).await?;
      tracing::info!(
        iteration,
        core_count,
        runs_per_query = configuration.runs_per_query,
        scheduler = configuration.use_scheduler,
        "running configuration {}/{}",
        index + 1,
        total
      );
      tracing::debug!(%invocation, "launching benchmark");

      let outcome = self
        .launcher
        .launch(&invocation, &paths.output_file)
        .await
        .with_context(|| format!("iteration {iteration}, core count {core_count}"))?;
      report.runs += 1;

      if !outcome.success {
        tracing::warn!(
          iteration,
          core_count,
          status = %outcome,
          "benchmark exited unsuccessfully, continuing"
        );
        if self.config.status_warnings {
          status.warning(iteration, core_count, outcome).await?;
        }
        report.failures.push(Failure {
          configuration,
          outcome,
        });
      }
    }

    status.done().await?;
    write_name_marker(&paths.name_file, &layout.run_dir).await?;
    tracing::info!(
      run_dir = %report.run_dir.display(),
      runs = report.runs,
      failures = report.failures.len(),
      "sweep finished"
    );
    Ok(report)
  }
}
