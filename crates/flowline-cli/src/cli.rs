use std::path::PathBuf;

use clap::Parser;

/// Drive a task pipeline against remote scheduler and runner services.
#[derive(Debug, Parser)]
#[command(name = "flowline", version, about)]
pub struct CliArgs {
    /// Cluster config file (.yml)
    #[arg(long)]
    pub config_file: PathBuf,

    /// Runner file with the task graph (.json)
    #[arg(long)]
    pub runner_file: PathBuf,

    /// Scheduler file with the placement question (.json)
    #[arg(long)]
    pub scheduler_file: PathBuf,

    /// Global deadline in seconds; the run is cancelled when it expires.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Forward each task's "EOF" sentinel line to the output instead of
    /// treating it purely as a termination signal.
    #[arg(long)]
    pub forward_eof: bool,

    /// Log level filter (e.g. "info", "flowline_runner=debug").
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
