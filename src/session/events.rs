//! Access Events
//!
//! The input unit of the tracker: one request from one client.

use serde::{Deserialize, Serialize};

/// A single access from a client at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEvent {
    /// Client identity
    pub client_id: String,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
    /// How many requests this event stands for
    #[serde(default = "default_weight")]
    pub weight: u64,
}

fn default_weight() -> u64 {
    1
}

impl AccessEvent {
    /// Create a single-request event
    pub fn new(client_id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            client_id: client_id.into(),
            timestamp,
            weight: default_weight(),
        }
    }

    /// Set the number of requests this event stands for
    pub fn with_weight(mut self, weight: u64) -> Self {
        self.weight = weight;
        self
    }
}
