//! Change notification for the index filesystem
//!
//! The remote index does not change during a session, so the emitter never
//! fires and watch handles hold nothing. [`WatchHandle`] and
//! [`ChangeSubscription`] are separate types so that a watch handle cannot be
//! mistaken for a live event stream.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use url::Url;

/// Something that can be released exactly once
pub trait Disposable: Send {
    fn dispose(self: Box<Self>);
}

/// Kind of change reported by a filesystem provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileChangeType {
    Changed,
    Created,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChangeEvent {
    pub kind: FileChangeType,
    pub uri: Url,
}

/// Event source for file changes. Never emits.
#[derive(Debug)]
pub struct ChangeEmitter {
    sender: broadcast::Sender<Vec<FileChangeEvent>>,
}

impl ChangeEmitter {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    pub fn subscribe(&self) -> ChangeSubscription {
        ChangeSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeEmitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Live subscription to a [`ChangeEmitter`]
#[derive(Debug)]
pub struct ChangeSubscription {
    receiver: broadcast::Receiver<Vec<FileChangeEvent>>,
}

impl ChangeSubscription {
    /// Wait for the next batch of changes.
    ///
    /// Returns `None` once the emitter is gone.
    pub async fn recv(&mut self) -> Option<Vec<FileChangeEvent>> {
        loop {
            match self.receiver.recv().await {
                Ok(events) => return Some(events),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Dropped {} file change batches", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Disposable for ChangeSubscription {
    fn dispose(self: Box<Self>) {}
}

/// Handle returned by `watch`. Registers nothing, so disposal does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatchHandle;

impl Disposable for WatchHandle {
    fn dispose(self: Box<Self>) {}
}
