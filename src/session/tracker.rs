//! Session Tracker
//!
//! Owns the table of active sessions, closes sessions once the stream's
//! clock has moved past their inactivity threshold, and hands closed
//! sessions back in start-time order.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use super::events::AccessEvent;
use super::state::{sort_records, Session, SessionRecord};

/// What to do with an event whose timestamp runs behind the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderingPolicy {
    /// Apply the event as-is and log a warning
    #[default]
    Accept,
    /// Refuse the event without touching any state
    Reject,
}

impl std::fmt::Display for OrderingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for OrderingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown ordering policy: {}", other)),
        }
    }
}

/// When closed sessions are handed back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputOrder {
    /// Hold a closed session until no open session started before it, so
    /// every batch, concatenated in call order, is sorted by start time
    #[default]
    Global,
    /// Hand sessions back as soon as they close, each batch sorted on its own
    PerBatch,
}

impl std::fmt::Display for OutputOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::PerBatch => write!(f, "per-batch"),
        }
    }
}

impl FromStr for OutputOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "per-batch" | "per_batch" => Ok(Self::PerBatch),
            other => Err(format!("unknown output order: {}", other)),
        }
    }
}

/// Tracks active sessions keyed by client id
#[derive(Debug)]
pub struct SessionTracker {
    /// Active sessions (client_id -> Session)
    sessions: HashMap<String, Session>,
    /// Largest gap, in seconds, a session may sit idle and stay open
    inactivity_threshold: i64,
    /// Timestamp of the last processed event, `None` before the first one
    last_processed_time: Option<i64>,
    ordering: OrderingPolicy,
    output_order: OutputOrder,
    /// Closed sessions held back under [`OutputOrder::Global`], sorted
    pending: Vec<SessionRecord>,
}

impl SessionTracker {
    /// Create a tracker with the given inactivity threshold in seconds
    pub fn new(inactivity_threshold: i64) -> TrackerResult<Self> {
        if inactivity_threshold < 0 {
            return Err(TrackerError::NegativeThreshold(inactivity_threshold));
        }

        Ok(Self {
            sessions: HashMap::new(),
            inactivity_threshold,
            last_processed_time: None,
            ordering: OrderingPolicy::default(),
            output_order: OutputOrder::default(),
            pending: Vec::new(),
        })
    }

    /// Set how out-of-order timestamps are handled
    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }

    /// Set when closed sessions are handed back
    pub fn with_output_order(mut self, output_order: OutputOrder) -> Self {
        self.output_order = output_order;
        self
    }

    /// Feed one event and collect the sessions that are now ready to emit.
    ///
    /// Expired sessions are only looked for when the event's timestamp
    /// differs from the previous event's. The returned batch is sorted by
    /// start time, then client id. Under [`OutputOrder::Global`] a closed
    /// session waits until every session started before it has closed too.
    pub fn process_event(&mut self, event: AccessEvent) -> TrackerResult<Vec<SessionRecord>> {
        let AccessEvent {
            client_id,
            timestamp: time,
            weight,
        } = event;

        if weight == 0 {
            return Err(TrackerError::ZeroWeight(client_id));
        }

        if let Some(behind) = self.ordering_violation(&client_id, time) {
            match self.ordering {
                OrderingPolicy::Reject => {
                    return Err(TrackerError::OutOfOrder {
                        client_id,
                        timestamp: time,
                        latest: behind,
                    });
                }
                OrderingPolicy::Accept => {
                    warn!(
                        "Out-of-order event for {}: {} is behind {}",
                        client_id, time, behind
                    );
                }
            }
        }

        match self.sessions.get_mut(&client_id) {
            Some(session) => session.record_event(time, weight),
            None => {
                debug!("Opened session for {} at {}", client_id, time);
                let session = Session::with_weight(client_id.clone(), time, weight);
                self.sessions.insert(client_id, session);
            }
        }

        let ready = if self.last_processed_time != Some(time) {
            let closed = self.evict_expired(time);
            match self.output_order {
                OutputOrder::PerBatch => closed,
                OutputOrder::Global => self.release(closed),
            }
        } else {
            Vec::new()
        };

        self.last_processed_time = Some(time);
        Ok(ready)
    }

    /// Close every remaining session and empty the table.
    ///
    /// Sessions still held back are returned too. The tracker is reset and
    /// may be fed a fresh stream afterwards.
    pub fn flush(&mut self) -> Vec<SessionRecord> {
        let mut closed = std::mem::take(&mut self.pending);
        closed.extend(self.sessions.drain().map(|(_, session)| session.into_record()));
        sort_records(&mut closed);

        self.last_processed_time = None;
        debug!("Flushed {} sessions", closed.len());
        closed
    }

    /// Number of sessions still open
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Check if a client currently has an open session
    pub fn is_active(&self, client_id: &str) -> bool {
        self.sessions.contains_key(client_id)
    }

    /// Get the open session for a client
    pub fn get_session(&self, client_id: &str) -> Option<&Session> {
        self.sessions.get(client_id)
    }

    pub fn inactivity_threshold(&self) -> i64 {
        self.inactivity_threshold
    }

    pub fn last_processed_time(&self) -> Option<i64> {
        self.last_processed_time
    }

    pub fn ordering(&self) -> OrderingPolicy {
        self.ordering
    }

    pub fn output_order(&self) -> OutputOrder {
        self.output_order
    }

    /// Number of closed sessions waiting for earlier sessions to close
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Queue newly closed sessions and hand back those that sort before
    /// every open session
    fn release(&mut self, closed: Vec<SessionRecord>) -> Vec<SessionRecord> {
        if closed.is_empty() {
            return closed;
        }
        self.pending.extend(closed);
        sort_records(&mut self.pending);

        let earliest_open = self
            .sessions
            .values()
            .map(|s| (s.start_time, s.client_id.as_str()))
            .min();
        let ready = match earliest_open {
            Some(open) => self.pending.partition_point(|r| r.order_key() < open),
            None => self.pending.len(),
        };

        if ready < self.pending.len() {
            debug!("Holding {} closed sessions", self.pending.len() - ready);
        }
        self.pending.drain(..ready).collect()
    }

    /// The later timestamp `time` runs behind, if any
    fn ordering_violation(&self, client_id: &str, time: i64) -> Option<i64> {
        let client_latest = self.sessions.get(client_id).map(|s| s.last_seen_time);
        [self.last_processed_time, client_latest]
            .into_iter()
            .flatten()
            .filter(|&latest| time < latest)
            .max()
    }

    /// Remove sessions idle for longer than the threshold as of `now`
    fn evict_expired(&mut self, now: i64) -> Vec<SessionRecord> {
        let expired_ids: Vec<String> = self
            .sessions
            .values()
            .filter(|s| s.idle_secs(now) > self.inactivity_threshold)
            .map(|s| s.client_id.clone())
            .collect();

        let mut closed: Vec<SessionRecord> = expired_ids
            .iter()
            .filter_map(|id| self.sessions.remove(id))
            .map(Session::into_record)
            .collect();
        sort_records(&mut closed);

        if !closed.is_empty() {
            debug!(
                "Closed {} sessions at {}, {} still active",
                closed.len(),
                now,
                self.sessions.len()
            );
        }
        closed
    }
}

/// Session tracker errors
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Inactivity threshold must be non-negative, got {0}")]
    NegativeThreshold(i64),

    #[error("Event for {0} has zero weight")]
    ZeroWeight(String),

    #[error("Out-of-order event for {client_id}: {timestamp} is behind {latest}")]
    OutOfOrder {
        client_id: String,
        timestamp: i64,
        latest: i64,
    },
}

/// Result type alias for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;
