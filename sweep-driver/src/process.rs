//! Scoped execution of the external benchmark.
//!
//! A launch acquires the child handle, points both of its output streams at the output log
//! (append mode), and waits for exit. The handle is spawned with `kill_on_drop`, so if the
//! awaiting future is dropped mid-run (Ctrl-C) the child is killed instead of outliving
//! the driver.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub program: PathBuf,
  pub args: Vec<OsString>,
  pub working_dir: PathBuf,
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program.display())?;
    for arg in &self.args {
      write!(f, " {}", arg.to_string_lossy())?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
  /// `None` when the child was terminated by a signal
  pub code: Option<i32>,
  pub success: bool,
}

impl ExitOutcome {
  pub const SUCCESS: ExitOutcome = ExitOutcome {
    code: Some(0),
    success: true,
  };
}

impl From<std::process::ExitStatus> for ExitOutcome {
  fn from(status: std::process::ExitStatus) -> Self {
    Self {
      code: status.code(),
      success: status.success(),
    }
  }
}

impl fmt::Display for ExitOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.code {
      Some(code) => write!(f, "{code}"),
      None => write!(f, "signal"),
    }
  }
}

/// Runs one benchmark invocation to completion.
///
/// Failing to start the process is an error. A process that starts and then exits
/// unsuccessfully is not; its outcome is returned for the caller to report.
#[allow(async_fn_in_trait)]
pub trait Launcher {
  async fn launch(&self, invocation: &Invocation, output_log: &Path) -> Result<ExitOutcome>;
}

/// [`Launcher`] backed by a real child process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChildLauncher;

impl Launcher for ChildLauncher {
  async fn launch(&self, invocation: &Invocation, output_log: &Path) -> Result<ExitOutcome> {
    let stdout = tokio::fs::OpenOptions::new()
      .create(true)
      .append(true)
      .open(output_log)
      .await
      .with_context(|| format!("failed to open output log {}", output_log.display()))?
      .into_std()
      .await;
    let stderr = stdout
      .try_clone()
      .context("failed to share output log with stderr")?;

    let mut child = Command::new(&invocation.program)
      .args(&invocation.args)
      .current_dir(&invocation.working_dir)
      .stdin(Stdio::null())
      .stdout(stdout)
      .stderr(stderr)
      .kill_on_drop(true)
      .spawn()
      .with_context(|| format!("failed to launch {}", invocation.program.display()))?;

    let status = child
      .wait()
      .await
      .with_context(|| format!("failed to wait for {}", invocation.program.display()))?;
    Ok(status.into())
  }
}
