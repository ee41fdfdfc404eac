//! Command-line interface

use clap::Parser;
use std::path::PathBuf;

use crate::config::{ConfigResult, FileConfig, Overrides, RunConfig};
use crate::edgar::OutputFormat;
use crate::session::{OrderingPolicy, OutputOrder};

/// Group web access logs into per-client sessions
#[derive(Debug, Parser)]
#[command(name = "sessionize")]
#[command(version)]
#[command(about = "Group web access logs into per-client sessions")]
pub struct Cli {
    /// Access log in EDGAR CSV format
    pub input: PathBuf,

    /// Where to write closed sessions
    pub output: PathBuf,

    /// Inactivity period in seconds; overrides any file
    #[arg(long, value_name = "SECS")]
    pub inactivity: Option<i64>,

    /// File holding the inactivity period [default: inactivity_period.txt beside INPUT]
    #[arg(long, value_name = "PATH")]
    pub inactivity_file: Option<PathBuf>,

    /// TOML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format: csv or json
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Out-of-order timestamps: accept or reject
    #[arg(long)]
    pub ordering: Option<OrderingPolicy>,

    /// When closed sessions are written: global (start-time order) or per-batch
    #[arg(long)]
    pub output_order: Option<OutputOrder>,

    /// Fail on malformed rows instead of skipping them
    #[arg(long)]
    pub strict: bool,

    /// Log every processed row
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve flags and the optional config file into a run configuration
    pub fn into_config(self) -> ConfigResult<RunConfig> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        let overrides = Overrides {
            inactivity_period: self.inactivity,
            inactivity_file: self.inactivity_file,
            format: self.format,
            ordering: self.ordering,
            output_order: self.output_order,
            strict: self.strict,
        };
        RunConfig::resolve(self.input, self.output, overrides, file)
    }
}
