//! Tracker Actor
//!
//! Runs a tracker on its own tokio task. Callers talk to it through a
//! cloneable [`TrackerHandle`]; commands are applied strictly in the order
//! the actor receives them.

use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::events::AccessEvent;
use super::state::SessionRecord;
use super::tracker::{SessionTracker, TrackerError, TrackerResult};

/// Default command queue depth
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

enum Command {
    Process {
        event: AccessEvent,
        reply: oneshot::Sender<TrackerResult<Vec<SessionRecord>>>,
    },
    Flush {
        reply: oneshot::Sender<Vec<SessionRecord>>,
    },
    ActiveCount {
        reply: oneshot::Sender<usize>,
    },
}

/// Handle for sending work to a running tracker actor
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    tx: mpsc::Sender<Command>,
}

impl TrackerHandle {
    /// Process one event on the actor
    pub async fn process_event(&self, event: AccessEvent) -> Result<Vec<SessionRecord>, ActorError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Process { event, reply }).await?;
        Ok(rx.await.map_err(|_| ActorError::Stopped)??)
    }

    /// Flush every remaining session on the actor
    pub async fn flush(&self) -> Result<Vec<SessionRecord>, ActorError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Flush { reply }).await?;
        rx.await.map_err(|_| ActorError::Stopped)
    }

    pub async fn active_count(&self) -> Result<usize, ActorError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::ActiveCount { reply }).await?;
        rx.await.map_err(|_| ActorError::Stopped)
    }

    async fn send(&self, command: Command) -> Result<(), ActorError> {
        self.tx.send(command).await.map_err(|_| ActorError::Stopped)
    }
}

/// Owns a tracker for the lifetime of its task
pub struct TrackerActor {
    tracker: SessionTracker,
    rx: mpsc::Receiver<Command>,
}

impl TrackerActor {
    /// Spawn the actor on the current runtime.
    ///
    /// The task ends once every handle is dropped and hands the tracker
    /// back through the join handle.
    pub fn spawn(tracker: SessionTracker) -> (TrackerHandle, JoinHandle<SessionTracker>) {
        Self::spawn_with_capacity(tracker, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn spawn_with_capacity(
        tracker: SessionTracker,
        capacity: usize,
    ) -> (TrackerHandle, JoinHandle<SessionTracker>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let actor = Self { tracker, rx };
        let join = tokio::spawn(actor.run());
        (TrackerHandle { tx }, join)
    }

    async fn run(mut self) -> SessionTracker {
        debug!("Tracker actor started");

        while let Some(command) = self.rx.recv().await {
            match command {
                Command::Process { event, reply } => {
                    let _ = reply.send(self.tracker.process_event(event));
                }
                Command::Flush { reply } => {
                    let _ = reply.send(self.tracker.flush());
                }
                Command::ActiveCount { reply } => {
                    let _ = reply.send(self.tracker.active_count());
                }
            }
        }

        let remaining = self.tracker.active_count();
        if remaining > 0 {
            warn!("Tracker actor stopped with {} unflushed sessions", remaining);
        } else {
            info!("Tracker actor stopped");
        }
        self.tracker
    }
}

/// Tracker actor errors
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error("Tracker actor has stopped")]
    Stopped,
}
