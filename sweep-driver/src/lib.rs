//! This crate drives a NUMA TPC-H benchmark sweep, including:
//! - creating the timestamped run directory and clearing the shared status files
//! - running the external benchmark once per (iteration, core count), strictly in sequence
//! - progress reporting through the status file and `tracing`
//!
//! The planning rules themselves live in `sweep-core`.

pub mod config;
pub mod driver;
pub mod layout;
pub mod logging;
pub mod process;
pub mod state;

pub use config::{DriverConfig, SweepPaths};
pub use driver::{Driver, Failure, SweepReport};
pub use process::{ChildLauncher, ExitOutcome, Invocation, Launcher};
