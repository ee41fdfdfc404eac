//! EDGAR Log I/O
//!
//! Everything around the tracker that touches bytes: reading access logs,
//! converting timestamps and writing closed sessions.

pub mod error;
pub mod reader;
pub mod time;
pub mod writer;

pub use error::{LogError, LogResult};
pub use reader::LogReader;
pub use time::{format_timestamp, parse_timestamp};
pub use writer::{OutputFormat, SessionWriter};
