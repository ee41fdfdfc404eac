//! Access Log Reader
//!
//! Reads EDGAR-style CSV access logs into [`AccessEvent`]s. Columns are
//! located by header name, so extra or reordered columns are fine.

use log::{debug, warn};
use std::io::{BufRead, Lines};

use super::error::{LogError, LogResult};
use super::time::parse_timestamp;
use crate::session::AccessEvent;

pub const CLIENT_COLUMN: &str = "ip";
pub const DATE_COLUMN: &str = "date";
pub const TIME_COLUMN: &str = "time";

/// Positions of the columns the reader cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    client: usize,
    date: usize,
    time: usize,
    width: usize,
}

impl Columns {
    fn from_header(header: &str) -> LogResult<Self> {
        let names: Vec<String> = header
            .split(',')
            .map(|name| name.trim().to_ascii_lowercase())
            .collect();
        let find = |wanted: &str| {
            names
                .iter()
                .position(|name| name == wanted)
                .ok_or_else(|| LogError::MissingColumn(wanted.to_string()))
        };

        let client = find(CLIENT_COLUMN)?;
        let date = find(DATE_COLUMN)?;
        let time = find(TIME_COLUMN)?;

        Ok(Self {
            client,
            date,
            time,
            width: client.max(date).max(time) + 1,
        })
    }
}

/// Streaming reader over an access log
pub struct LogReader<R> {
    lines: Lines<R>,
    columns: Columns,
    /// 1-based number of the last line read
    line_no: usize,
    /// Rows dropped because they could not be parsed
    skipped: usize,
    /// Fail on malformed rows instead of skipping them
    strict: bool,
}

impl<R: BufRead> LogReader<R> {
    /// Create a reader, consuming the header row
    pub fn new(reader: R) -> LogResult<Self> {
        let mut lines = reader.lines();
        let mut line_no = 0;

        let header = loop {
            match lines.next() {
                Some(line) => {
                    line_no += 1;
                    let line = line?;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
                None => return Err(LogError::MissingHeader),
            }
        };

        let columns = Columns::from_header(&header)?;
        debug!("Log columns: {:?}", columns);

        Ok(Self {
            lines,
            columns,
            line_no,
            skipped: 0,
            strict: false,
        })
    }

    /// Fail on the first malformed row
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Number of malformed rows skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Number of lines consumed so far, header included
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    fn parse_row(&self, row: &str) -> LogResult<AccessEvent> {
        let fields: Vec<&str> = row.split(',').collect();
        if fields.len() < self.columns.width {
            return Err(LogError::MalformedRow {
                line: self.line_no,
                reason: format!(
                    "expected at least {} fields, found {}",
                    self.columns.width,
                    fields.len()
                ),
            });
        }

        let client_id = fields[self.columns.client].trim();
        if client_id.is_empty() {
            return Err(LogError::MalformedRow {
                line: self.line_no,
                reason: "empty client id".to_string(),
            });
        }

        let timestamp = parse_timestamp(fields[self.columns.date], fields[self.columns.time])
            .map_err(|e| LogError::MalformedRow {
                line: self.line_no,
                reason: e.to_string(),
            })?;

        Ok(AccessEvent::new(client_id, timestamp))
    }
}

impl<R: BufRead> Iterator for LogReader<R> {
    type Item = LogResult<AccessEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }

            match self.parse_row(&line) {
                Ok(event) => return Some(Ok(event)),
                Err(e) if self.strict => return Some(Err(e)),
                Err(e) => {
                    warn!("Skipping row: {}", e);
                    self.skipped += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str =
        "ip,date,time,zone,cik,accession,extention,code,size,idx,norefer,noagent,find,crawler,browser";

    fn reader(body: &str) -> LogReader<Cursor<String>> {
        LogReader::new(Cursor::new(format!("{}\n{}", HEADER, body))).unwrap()
    }

    #[test]
    fn test_reads_events() {
        let events: Vec<_> = reader(
            "101.81.133.jja,2017-06-30,00:00:00,0.0,1608552.0,0001047469-17-004337,-index.htm,200.0,80251.0,1.0,0.0,0.0,9.0,0.0,\n\
             107.23.85.jfd,2017-06-30,00:00:02,0.0,1027281.0,0000898430-02-001167,-index.htm,200.0,2825.0,1.0,0.0,0.0,10.0,0.0,\n",
        )
        .collect::<LogResult<_>>()
        .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].client_id, "101.81.133.jja");
        assert_eq!(events[1].timestamp - events[0].timestamp, 2);
        assert_eq!(events[1].weight, 1);
    }

    #[test]
    fn test_columns_found_by_name() {
        let log = "time,ip,extra,date\n00:00:05,a.b.c.d,x,2017-06-30\n";
        let events: Vec<_> = LogReader::new(Cursor::new(log))
            .unwrap()
            .collect::<LogResult<_>>()
            .unwrap();
        assert_eq!(events, vec![AccessEvent::new("a.b.c.d", 1_498_780_805)]);
    }

    #[test]
    fn test_missing_column() {
        let result = LogReader::new(Cursor::new("ip,date\n"));
        assert!(matches!(result, Err(LogError::MissingColumn(c)) if c == "time"));
    }

    #[test]
    fn test_empty_input() {
        let result = LogReader::new(Cursor::new("\n\n"));
        assert!(matches!(result, Err(LogError::MissingHeader)));
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let mut log = reader(
            "a,2017-06-30,00:00:00\n\
             \n\
             b,2017-06-30\n\
             ,2017-06-30,00:00:01\n\
             c,not-a-date,00:00:01\n\
             d,2017-06-30,00:00:03\n",
        );
        let events: Vec<_> = log.by_ref().collect::<LogResult<_>>().unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.client_id.as_str()).collect();

        assert_eq!(ids, vec!["a", "d"]);
        assert_eq!(log.skipped(), 3);
        assert_eq!(log.line_no(), 7);
    }

    #[test]
    fn test_strict_mode_fails() {
        let mut log = reader("a,2017-06-30,00:00:00\nb,2017-06-30,xx\n").strict(true);
        assert!(log.next().unwrap().is_ok());
        assert!(matches!(
            log.next(),
            Some(Err(LogError::MalformedRow { line: 3, .. }))
        ));
    }
}
