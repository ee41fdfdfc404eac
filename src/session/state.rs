//! Session State
//!
//! Tracks the activity window of a single client and the immutable
//! record produced when that window closes.

/// Active window of one client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Client identity (the IP address in EDGAR logs)
    pub client_id: String,
    /// Timestamp of the first event, fixed for the session's lifetime
    pub start_time: i64,
    /// Timestamp of the most recent event
    pub last_seen_time: i64,
    /// Number of events attributed to this session
    pub event_count: u64,
}

impl Session {
    /// Create a session opened by a single event
    pub fn new(client_id: impl Into<String>, start_time: i64) -> Self {
        Self {
            client_id: client_id.into(),
            start_time,
            last_seen_time: start_time,
            event_count: 1,
        }
    }

    /// Create a session whose opening event carries `weight`
    pub(crate) fn with_weight(client_id: impl Into<String>, start_time: i64, weight: u64) -> Self {
        Self {
            event_count: weight,
            ..Self::new(client_id, start_time)
        }
    }

    /// Attribute another event to this session.
    ///
    /// Timestamps are taken as given; ordering is the tracker's concern.
    pub fn record_event(&mut self, time: i64, weight: u64) {
        self.last_seen_time = time;
        self.event_count = self.event_count.saturating_add(weight);
    }

    /// Seconds since the last event, measured against `now`
    pub fn idle_secs(&self, now: i64) -> i64 {
        now.saturating_sub(self.last_seen_time)
    }

    /// Snapshot this session into a closed record
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            client_id: self.client_id.clone(),
            start_time: self.start_time,
            last_seen_time: self.last_seen_time,
            duration: inclusive_duration(self.start_time, self.last_seen_time),
            event_count: self.event_count,
        }
    }

    /// Consume the session into its closed record
    pub(crate) fn into_record(self) -> SessionRecord {
        let duration = inclusive_duration(self.start_time, self.last_seen_time);
        SessionRecord {
            client_id: self.client_id,
            start_time: self.start_time,
            last_seen_time: self.last_seen_time,
            duration,
            event_count: self.event_count,
        }
    }
}

/// `last - start + 1`, saturating at the ends of the `i64` range
fn inclusive_duration(start: i64, last: i64) -> i64 {
    last.saturating_sub(start).saturating_add(1)
}

/// Closed session, as handed to the output boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub client_id: String,
    pub start_time: i64,
    pub last_seen_time: i64,
    /// Inclusive duration in seconds; a single-event session lasts 1
    pub duration: i64,
    pub event_count: u64,
}

impl SessionRecord {
    /// Output ordering key: start time, ties broken by client id
    pub(crate) fn order_key(&self) -> (i64, &str) {
        (self.start_time, self.client_id.as_str())
    }
}

/// Sort a batch of closed records into output order
pub(crate) fn sort_records(records: &mut [SessionRecord]) {
    records.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
}
