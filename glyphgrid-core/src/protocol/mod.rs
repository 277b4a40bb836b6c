//! Producer/consumer wire protocol.
//!
//! The producer flattens a scene buffer into a [`FramePacket`]: per-cell runs
//! of content keys, plus the registration payloads for any key the consumer
//! has not seen yet. Registrations always travel inside the packet that first
//! references them, so a key is registered before (or alongside) its first
//! use. The consumer's cache relies on that ordering invariant.

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use rustc_hash::FxHashSet;

use crate::foundation::core::GridPos;
use crate::scene::buffer::Buffer;
use crate::scene::dot::{Dot, DotKey};

/// One non-empty cell on the wire: its position and the content keys of its
/// stack, back to front.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireCell {
    pub pos: GridPos,
    pub keys: Vec<DotKey>,
}

/// The draw payload for one producer tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FramePacket {
    /// Producer tick that emitted this packet.
    pub frame: u64,
    /// Blank the canvas before drawing this packet.
    pub clear_screen: bool,
    /// Keys first referenced by this packet, with their canonical dots.
    pub registrations: Vec<(DotKey, Dot)>,
    pub cells: Vec<WireCell>,
}

impl FramePacket {
    /// A packet carrying no visual change at all.
    pub fn is_no_change(&self) -> bool {
        self.cells.is_empty() && self.registrations.is_empty() && !self.clear_screen
    }
}

/// Control signals on the producer → consumer action queue.
#[derive(Clone, Debug)]
pub enum Action {
    Frame(FramePacket),
    Clear,
    Present,
    Quit,
}

/// Input event categories forwarded from the display to the producer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventCategory {
    KeyDown,
    KeyUp,
    MouseButtonDown,
    MouseButtonUp,
    MouseMotion,
}

/// One input event: a category plus the attribute handlers key on (key name,
/// mouse button id; empty for motion) and an optional pixel position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputEvent {
    pub category: EventCategory,
    pub attr: String,
    pub pos: Option<(i32, i32)>,
}

impl InputEvent {
    pub fn key_down(name: impl Into<String>) -> Self {
        Self {
            category: EventCategory::KeyDown,
            attr: normalize_attr(name.into()),
            pos: None,
        }
    }

    pub fn key_up(name: impl Into<String>) -> Self {
        Self {
            category: EventCategory::KeyUp,
            attr: normalize_attr(name.into()),
            pos: None,
        }
    }

    pub fn mouse_button_down(button: u8, pos: (i32, i32)) -> Self {
        Self {
            category: EventCategory::MouseButtonDown,
            attr: button.to_string(),
            pos: Some(pos),
        }
    }

    pub fn mouse_button_up(button: u8, pos: (i32, i32)) -> Self {
        Self {
            category: EventCategory::MouseButtonUp,
            attr: button.to_string(),
            pos: Some(pos),
        }
    }

    pub fn mouse_motion(pos: (i32, i32)) -> Self {
        Self {
            category: EventCategory::MouseMotion,
            attr: String::new(),
            pos: Some(pos),
        }
    }
}

/// Key names are matched uppercased with spaces collapsed to underscores
/// ("left shift" and "LEFT_SHIFT" address the same handler).
pub(crate) fn normalize_attr(raw: String) -> String {
    raw.trim().replace(' ', "_").to_ascii_uppercase()
}

/// A batch of events captured during one consumer frame.
pub type EventBatch = Vec<InputEvent>;

/// The producer's write-only registration state: which content keys this
/// process has already announced. The actual tile cache lives on the consumer
/// side only; this type never holds pixels.
#[derive(Debug, Default)]
pub struct DotRegistry {
    seen: FxHashSet<u64>,
}

impl DotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keys announced so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Returns the registration payload for `dot` if its key is new to this
    /// producer, `None` if it was announced before. Idempotent per lifetime.
    pub fn register(&mut self, dot: &Dot) -> Option<(DotKey, Dot)> {
        let key = dot.content_key();
        if self.seen.insert(key.0) {
            // Canonical payload: position is not part of the content.
            Some((key, dot.clone().with_pos((0, 0))))
        } else {
            None
        }
    }
}

/// Flatten `buffer` into the draw payload for tick `frame`, announcing any
/// content keys `registry` has not seen yet.
#[tracing::instrument(skip(buffer, registry))]
pub fn encode_buffer(frame: u64, buffer: &Buffer, registry: &mut DotRegistry) -> FramePacket {
    let mut packet = FramePacket {
        frame,
        clear_screen: true,
        ..FramePacket::default()
    };
    for (pos, dots) in buffer.cells() {
        let mut keys = Vec::with_capacity(dots.len());
        for dot in dots {
            if let Some(registration) = registry.register(dot) {
                packet.registrations.push(registration);
            }
            keys.push(dot.content_key());
        }
        packet.cells.push(WireCell { pos, keys });
    }
    packet
}

/// Producer-side channel endpoints.
pub struct ProducerLink {
    pub actions: Sender<Action>,
    pub events: Receiver<EventBatch>,
}

/// Consumer-side channel endpoints.
pub struct ConsumerLink {
    pub actions: Receiver<Action>,
    pub events: Sender<EventBatch>,
}

/// Build the queue pair connecting producer and consumer.
///
/// The action queue is unbounded FIFO (frame order is delivery order). The
/// event queue is bounded: the consumer pushes with `try_send` and drops the
/// batch under backpressure rather than stalling the display loop.
pub fn link(event_capacity: usize) -> (ProducerLink, ConsumerLink) {
    let (action_tx, action_rx) = unbounded();
    let (event_tx, event_rx) = bounded(event_capacity.max(1));
    (
        ProducerLink {
            actions: action_tx,
            events: event_rx,
        },
        ConsumerLink {
            actions: action_rx,
            events: event_tx,
        },
    )
}
