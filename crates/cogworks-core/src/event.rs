//! Typed event bus for board mutations and rotation outcomes.
//!
//! Events are buffered as they are emitted during an operation and
//! delivered in batch afterwards, preserving per-operation ordering:
//! every successful topology mutation publishes exactly one
//! [`Event::ActivePathChanged`] (including the degenerate empty path), and
//! a character fires at most one [`Event::CharacterSpawned`] per rotation
//! tick.

use crate::fixed::Ticks;
use crate::grid::GridPosition;
use crate::id::GearId;
use crate::rotate::Spin;
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A board event. All events carry the tick at which they occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // -- Topology --
    GearPlaced {
        gear: GearId,
        position: GridPosition,
        tick: Ticks,
    },
    GearsMerged {
        upgraded: GearId,
        position: GridPosition,
        subtype: u8,
        tick: Ticks,
    },
    GearsSwapped {
        dragged: GearId,
        displaced: GearId,
        tick: Ticks,
    },
    GearRemoved {
        gear: GearId,
        position: GridPosition,
        tick: Ticks,
    },

    // -- Connectivity --
    ActivePathChanged {
        path: BTreeSet<GridPosition>,
        tick: Ticks,
    },

    // -- Rotation / production --
    RotationTicked {
        gear: GearId,
        spin: Spin,
        tick: Ticks,
    },
    CharacterSpawned {
        gear: GearId,
        position: GridPosition,
        tick: Ticks,
    },
}

/// Discriminant tag for event types, used for listener filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    GearPlaced,
    GearsMerged,
    GearsSwapped,
    GearRemoved,
    ActivePathChanged,
    RotationTicked,
    CharacterSpawned,
}

impl Event {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::GearPlaced { .. } => EventKind::GearPlaced,
            Event::GearsMerged { .. } => EventKind::GearsMerged,
            Event::GearsSwapped { .. } => EventKind::GearsSwapped,
            Event::GearRemoved { .. } => EventKind::GearRemoved,
            Event::ActivePathChanged { .. } => EventKind::ActivePathChanged,
            Event::RotationTicked { .. } => EventKind::RotationTicked,
            Event::CharacterSpawned { .. } => EventKind::CharacterSpawned,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// A passive listener receives events read-only during delivery.
pub type PassiveListener = Box<dyn FnMut(&Event)>;

struct ListenerEntry {
    kind: EventKind,
    listener: PassiveListener,
}

/// Buffering event bus. Emitters push during an operation; the owner
/// drains after the operation completes, so no listener ever observes a
/// half-applied board.
#[derive(Default)]
pub struct EventBus {
    buffer: Vec<Event>,
    listeners: Vec<ListenerEntry>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("buffer", &self.buffer)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer an event for the next delivery.
    pub fn emit(&mut self, event: Event) {
        self.buffer.push(event);
    }

    /// Register a listener for one event kind. Listeners of the same kind
    /// run in registration order.
    pub fn on_passive(&mut self, kind: EventKind, listener: PassiveListener) {
        self.listeners.push(ListenerEntry { kind, listener });
    }

    /// Deliver all buffered events to listeners, oldest first, and return
    /// them. The buffer is left empty.
    pub fn deliver(&mut self) -> Vec<Event> {
        let events = std::mem::take(&mut self.buffer);
        for event in &events {
            let kind = event.kind();
            for entry in &mut self.listeners {
                if entry.kind == kind {
                    (entry.listener)(event);
                }
            }
        }
        events
    }

    /// Number of buffered, undelivered events.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
