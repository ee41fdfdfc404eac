//! Session Tracking Module
//!
//! Inactivity-based sessionization:
//! - One active session per client, keyed by client id
//! - Sessions close once the stream's clock passes their inactivity threshold
//! - Closed sessions are emitted in start-time order
//!
//! [`SessionTracker`] is the single-threaded engine. [`SharedTracker`] and
//! [`TrackerActor`] wrap it for concurrent callers.

pub mod actor;
pub mod events;
pub mod shared;
pub mod state;
pub mod tracker;

pub use actor::{ActorError, TrackerActor, TrackerHandle};
pub use events::AccessEvent;
pub use shared::SharedTracker;
pub use state::{Session, SessionRecord};
pub use tracker::{OrderingPolicy, OutputOrder, SessionTracker, TrackerError, TrackerResult};
