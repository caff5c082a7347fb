//! Event system for registry operations
//!
//! Provides an event bus for notifying listeners about registry mutations.
//! Useful for:
//! - Audit logging
//! - Cache invalidation
//! - Real-time notifications

use tokio::sync::broadcast;
use tracing::trace;

/// Registry events emitted after successful mutations
#[derive(Debug, Clone)]
pub enum RegistryEvent {
    ObserverRegistered {
        observer: String,
        handle: String,
    },
    ObservationSubmitted {
        record_id: i64,
        submitter: String,
        category: String,
    },
    RecordValidated {
        record_id: i64,
        validator: String,
        confirmations: u32,
    },
    HonorGranted {
        observer: String,
        honor_id: i64,
    },
    HonorTypeCreated {
        honor_type_id: i64,
        name: String,
    },
}

/// Event bus for broadcasting registry events
pub struct EventBus {
    sender: broadcast::Sender<RegistryEvent>,
}

impl EventBus {
    /// Create a new event bus with default capacity
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create a new event bus with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers
    pub fn emit(&self, event: RegistryEvent) {
        trace!(event = ?event, "Emitting registry event");
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to registry events
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
