//! Sessionize Command
//!
//! Streams an access log through a [`SessionTracker`] and writes every
//! closed session, batch by batch, in the order the tracker returns them.

use anyhow::Context;
use log::{debug, info};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};

use crate::config::RunConfig;
use crate::edgar::{LogError, LogReader, SessionWriter};
use crate::session::{SessionTracker, TrackerError};

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Events fed to the tracker
    pub events: usize,
    /// Sessions written
    pub sessions: usize,
    /// Malformed rows skipped by the reader
    pub skipped_rows: usize,
    /// Largest number of sessions open at once
    pub peak_active: usize,
}

/// Errors raised while streaming a log through the tracker
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Log(#[from] LogError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// Feed every event from `reader` to `tracker`, then flush it.
///
/// Each batch goes to `writer` as soon as it is returned, which keeps the
/// output ordered by session start time.
pub fn run_pipeline<R: BufRead, W: Write>(
    reader: &mut LogReader<R>,
    tracker: &mut SessionTracker,
    writer: &mut SessionWriter<W>,
) -> Result<RunSummary, CommandError> {
    let mut summary = RunSummary::default();

    for event in reader.by_ref() {
        let event = event?;
        summary.events += 1;
        debug!("Row {}: {} at {}", summary.events, event.client_id, event.timestamp);

        let closed = tracker.process_event(event)?;
        summary.peak_active = summary.peak_active.max(tracker.active_count());
        writer.write_batch(&closed)?;
    }

    let remaining = tracker.flush();
    writer.write_batch(&remaining)?;

    summary.sessions = writer.written();
    summary.skipped_rows = reader.skipped();
    Ok(summary)
}

/// Sessionize the log named by `config` into its output file
pub fn sessionize(config: &RunConfig) -> anyhow::Result<RunSummary> {
    info!(
        "Sessionizing {:?} -> {:?} (inactivity {}s)",
        config.input, config.output, config.inactivity_threshold
    );

    let input = File::open(&config.input)
        .with_context(|| format!("Failed to open input log {:?}", config.input))?;
    let mut reader = LogReader::new(BufReader::new(input))
        .with_context(|| format!("Failed to read header of {:?}", config.input))?
        .strict(config.strict);

    let mut tracker = SessionTracker::new(config.inactivity_threshold)?
        .with_ordering(config.ordering)
        .with_output_order(config.output_order);

    if let Some(dir) = config.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;
    }
    let output = File::create(&config.output)
        .with_context(|| format!("Failed to create output file {:?}", config.output))?;
    let mut writer = SessionWriter::new(output, config.format);

    let summary = run_pipeline(&mut reader, &mut tracker, &mut writer)
        .with_context(|| format!("Failed at line {} of {:?}", reader.line_no(), config.input))?;
    writer
        .finish()
        .with_context(|| format!("Failed to write {:?}", config.output))?;

    info!(
        "Wrote {} sessions from {} events ({} rows skipped, peak {} active)",
        summary.sessions, summary.events, summary.skipped_rows, summary.peak_active
    );
    Ok(summary)
}
