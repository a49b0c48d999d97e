//! Command-line contract of the external TPC-H benchmark executable.
//!
//! `-v -o <result> -s <scale> --runs <n> --scheduler=<bool> --cores <n> --pcm (-q <id>)*`

use std::ffi::OsString;
use std::path::Path;

use crate::{layout::format_scale, Configuration, SweepConfig};

pub fn benchmark_args(
  sweep: &SweepConfig,
  configuration: &Configuration,
  result_file: &Path,
) -> Vec<OsString> {
  let mut args: Vec<OsString> = Vec::with_capacity(11 + 2 * sweep.queries.len());
  args.push("-v".into());
  args.push("-o".into());
  args.push(result_file.as_os_str().to_owned());
  args.push("-s".into());
  args.push(format_scale(sweep.scale).into());
  args.push("--runs".into());
  args.push(configuration.runs_per_query.to_string().into());
  args.push(format!("--scheduler={}", configuration.use_scheduler).into());
  args.push("--cores".into());
  args.push(configuration.core_count.to_string().into());
  // Hardware performance counters
  args.push("--pcm".into());
  for query in &sweep.queries {
    args.push("-q".into());
    args.push(query.to_string().into());
  }
  args
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use super::benchmark_args;
  use crate::{Configuration, SweepConfig};

  fn render(args: Vec<std::ffi::OsString>) -> Vec<String> {
    args
      .into_iter()
      .map(|arg| arg.to_string_lossy().into_owned())
      .collect()
  }

  #[test]
  fn test_args_with_scheduler() {
    let sweep = SweepConfig {
      queries: vec![1, 6],
      ..SweepConfig::default()
    };
    let configuration = Configuration::new(1, 2, 3);
    let args = render(benchmark_args(&sweep, &configuration, Path::new("results/x/2cores-1.json")));
    assert_eq!(
      args,
      vec![
        "-v",
        "-o",
        "results/x/2cores-1.json",
        "-s",
        "0.1",
        "--runs",
        "6",
        "--scheduler=true",
        "--cores",
        "2",
        "--pcm",
        "-q",
        "1",
        "-q",
        "6"
      ]
    );
  }

  #[test]
  fn test_args_without_scheduler() {
    let sweep = SweepConfig {
      scale: 1.0,
      queries: vec![],
      ..SweepConfig::default()
    };
    let configuration = Configuration::new(0, 0, 3);
    let args = render(benchmark_args(&sweep, &configuration, Path::new("0cores-0.json")));
    assert_eq!(
      args,
      vec![
        "-v",
        "-o",
        "0cores-0.json",
        "-s",
        "1.0",
        "--runs",
        "3",
        "--scheduler=false",
        "--cores",
        "0",
        "--pcm"
      ]
    );
  }

  #[test]
  fn test_one_query_flag_per_id() {
    let sweep = SweepConfig::default();
    let args = render(benchmark_args(&sweep, &Configuration::new(0, 4, 3), Path::new("r.json")));
    let query_flags = args.iter().filter(|arg| *arg == "-q").count();
    assert_eq!(query_flags, sweep.queries.len());
    assert_eq!(args.last().map(String::as_str), Some("13"));
  }
}
