//! Typed session event bus.
//!
//! Uses tokio::sync::broadcast for pub/sub pattern. The bus is the sole
//! channel between the board grid, group containers, and persistence
//! reporting; components never hold references to each other.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::collision::DragKind;
use crate::layout::LayoutAction;

/// Default bus capacity before slow subscribers start lagging.
const DEFAULT_CAPACITY: usize = 256;

/// Event types that can be published on the bus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum BoardEvent {
    // Drag session lifecycle
    SessionStarted {
        item_id: String,
        drag_kind: DragKind,
        origin_group: Option<String>,
    },
    HoverChanged {
        item_id: String,
        target_id: Option<String>,
    },
    /// The dragged member left its origin group's footprint.
    EjectOverlayShown { group_id: String },
    /// The dragged member re-entered its origin group's footprint.
    EjectOverlayHidden { group_id: String },
    SessionEnded {
        item_id: String,
        /// The single action the drop classified into, if any.
        applied: Option<LayoutAction>,
    },
    /// Defensive reset request; any live session must drop to idle.
    ForceInactive,
    /// A drop released directly onto an open group's internal area.
    ExplicitGroupDrop { group_id: String, item_id: String },

    // Persistence outcomes
    BoardSaved { board_sha: String },
    BoardSaveFailed { error: String },
    /// The whole board was replaced out-of-band (settings editor, reload).
    BoardReplaced { board_sha: String },
}

/// Event bus handle for publishing and subscribing
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BoardEvent>,
}

impl EventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: BoardEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.sender.subscribe()
    }

    /// Get the number of current subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Shared event bus wrapped in Arc for thread-safe sharing
pub type SharedBus = Arc<EventBus>;

/// Create a new shared event bus
pub fn create_bus() -> SharedBus {
    Arc::new(EventBus::default())
}
