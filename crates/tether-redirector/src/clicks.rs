//! Fire-and-forget click accounting.
//!
//! Resolutions enqueue a [`ClickEvent`] without waiting; a single background
//! worker applies them to the store. Delivery is at-most-once: a full queue,
//! a stopped worker or a failed increment all drop the click with a `warn!`.

use std::sync::Arc;
use std::time::Duration;
use tether_core::{LinkId, LinkRepository, ShortCode};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// A single click to be counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickEvent {
    /// A click on a record read from the store.
    Record(LinkId),
    /// A click served from the cache, where only the code is known.
    Code(ShortCode),
}

/// Producer side of the click queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ClickQueue {
    tx: mpsc::Sender<ClickEvent>,
}

impl ClickQueue {
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// Starts the background worker and returns the queue feeding it.
    ///
    /// The worker stops once every [`ClickQueue`] clone has been dropped and
    /// the already queued events are applied.
    pub fn spawn<R: LinkRepository>(repository: Arc<R>, capacity: usize) -> (Self, ClickWorker) {
        let (queue, rx) = Self::channel(capacity);
        let handle = tokio::spawn(run_worker(repository, rx));
        (queue, ClickWorker { handle })
    }

    pub(crate) fn channel(capacity: usize) -> (Self, mpsc::Receiver<ClickEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Enqueues a click without waiting. Returns `false` if it was dropped.
    pub fn record(&self, event: ClickEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!(event = ?event, "Click queue full, dropping click");
                false
            }
            Err(TrySendError::Closed(event)) => {
                warn!(event = ?event, "Click worker stopped, dropping click");
                false
            }
        }
    }
}

/// Handle to the background worker started by [`ClickQueue::spawn`].
#[derive(Debug)]
pub struct ClickWorker {
    handle: JoinHandle<u64>,
}

impl ClickWorker {
    /// Waits up to `limit` for the worker to apply what is already queued.
    ///
    /// Only finishes early if every [`ClickQueue`] has been dropped. Returns
    /// the number of increments applied, or `None` if the worker did not stop
    /// in time.
    pub async fn drain(self, limit: Duration) -> Option<u64> {
        match tokio::time::timeout(limit, self.handle).await {
            Ok(Ok(applied)) => {
                info!(applied, "Click worker drained");
                Some(applied)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Click worker terminated abnormally");
                None
            }
            Err(_) => {
                warn!(?limit, "Click worker did not drain in time, abandoning queued clicks");
                None
            }
        }
    }
}

async fn run_worker<R: LinkRepository>(
    repository: Arc<R>,
    mut rx: mpsc::Receiver<ClickEvent>,
) -> u64 {
    let mut applied = 0;

    while let Some(event) = rx.recv().await {
        let result = match &event {
            ClickEvent::Record(id) => repository.increment_clicks(*id).await,
            ClickEvent::Code(code) => repository.increment_clicks_by_code(code).await,
        };

        match result {
            Ok(()) => {
                trace!(event = ?event, "Click counted");
                applied += 1;
            }
            Err(e) => warn!(event = ?event, error = %e, "Click increment failed, dropping"),
        }
    }

    debug!(applied, "Click queue closed");
    applied
}
