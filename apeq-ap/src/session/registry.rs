//! Multicast listener registry with snapshot-iterate broadcasts
//!
//! Listeners register and unregister from arbitrary tasks, concurrently with
//! in-progress broadcasts. A broadcast takes a snapshot of the current
//! membership under the lock, then delivers outside it, so a concurrent
//! (un)registration either applies to the next broadcast or not at all.
//! Delivery is independent per listener: an unreachable listener is skipped
//! for that broadcast and stays registered until it unregisters itself.

use apeq_common::events::PlayerEvent;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;
use uuid::Uuid;

/// Registered listener handle
pub type ListenerId = Uuid;

/// Registry of playback event listeners.
#[derive(Debug, Clone, Default)]
pub struct CallbackRegistry {
    listeners: Arc<Mutex<HashMap<ListenerId, UnboundedSender<PlayerEvent>>>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new listener; events emitted after this call are delivered
    /// on the returned receiver (no backfill).
    pub fn register(&self) -> (ListenerId, UnboundedReceiver<PlayerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        self.listeners.lock().unwrap().insert(id, tx);
        (id, rx)
    }

    /// Remove a listener; returns false if it was not registered.
    pub fn unregister(&self, id: ListenerId) -> bool {
        self.listeners.lock().unwrap().remove(&id).is_some()
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    /// Deliver an event to every registered listener.
    pub fn broadcast(&self, event: PlayerEvent) {
        let snapshot: Vec<(ListenerId, UnboundedSender<PlayerEvent>)> = {
            let listeners = self.listeners.lock().unwrap();
            listeners
                .iter()
                .map(|(id, tx)| (*id, tx.clone()))
                .collect()
        };

        for (id, tx) in snapshot {
            if tx.send(event.clone()).is_err() {
                debug!("Listener {} unreachable, skipping", id);
            }
        }
    }
}
