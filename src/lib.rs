//! sessionize: inactivity-based sessionization of web access logs.
//!
//! [`session`] holds the tracking engine; [`edgar`], [`config`] and
//! [`commands`] wire it to files and the command line.

pub mod cli;
pub mod commands;
pub mod config;
pub mod edgar;
pub mod session;

use clap::Parser;
use log::error;

use cli::Cli;

/// Parse arguments, set up logging and run; exits non-zero on failure
pub fn run() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = try_run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn try_run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.into_config()?;
    commands::sessionize(&config)?;
    Ok(())
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .try_init();
}
