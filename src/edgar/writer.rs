//! Session Writer
//!
//! Appends closed sessions to an output sink, one line per session, in the
//! order they are handed over.

use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Write};
use std::str::FromStr;

use super::error::LogResult;
use super::time::format_timestamp;
use crate::session::SessionRecord;

/// Output line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `ip,start,end,duration,count`
    #[default]
    Csv,
    /// One JSON object per line
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" | "jsonl" => Ok(Self::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// JSON view of a record with formatted times
#[derive(Serialize)]
struct JsonLine<'a> {
    client_id: &'a str,
    start: String,
    end: String,
    duration: i64,
    event_count: u64,
}

impl<'a> From<&'a SessionRecord> for JsonLine<'a> {
    fn from(record: &'a SessionRecord) -> Self {
        Self {
            client_id: &record.client_id,
            start: format_timestamp(record.start_time),
            end: format_timestamp(record.last_seen_time),
            duration: record.duration,
            event_count: record.event_count,
        }
    }
}

/// Format one record as a CSV line, without the trailing newline
pub fn csv_line(record: &SessionRecord) -> String {
    format!(
        "{},{},{},{},{}",
        record.client_id,
        format_timestamp(record.start_time),
        format_timestamp(record.last_seen_time),
        record.duration,
        record.event_count
    )
}

/// Buffered sink for closed sessions
pub struct SessionWriter<W: Write> {
    out: BufWriter<W>,
    format: OutputFormat,
    written: usize,
}

impl<W: Write> SessionWriter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out: BufWriter::new(out),
            format,
            written: 0,
        }
    }

    /// Write a single record
    pub fn write_record(&mut self, record: &SessionRecord) -> LogResult<()> {
        match self.format {
            OutputFormat::Csv => writeln!(self.out, "{}", csv_line(record))?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, &JsonLine::from(record))?;
                writeln!(self.out)?;
            }
        }
        self.written += 1;
        Ok(())
    }

    /// Write a batch in the order given
    pub fn write_batch(&mut self, records: &[SessionRecord]) -> LogResult<()> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Number of records written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered output and return the sink
    pub fn finish(self) -> LogResult<W> {
        self.out.into_inner().map_err(|e| e.into_error().into())
    }
}
