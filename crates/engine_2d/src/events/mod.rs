//! Deferred event dispatch
//!
//! Key principles:
//! - Key-value arguments (no order dependency)
//! - Queuing: events submitted at any time are dispatched on the next run
//! - Registration system (only notify interested listeners)
//! - Listener add/remove requested while running is applied at the start of
//!   the next run, never mid-iteration

use crate::foundation::properties::Properties;
use slotmap::SlotMap;
use std::collections::{HashSet, VecDeque};

slotmap::new_key_type! {
    /// Handle to a registered event listener
    pub struct ListenerId;
}

/// An event with a string key and key-value arguments
#[derive(Debug)]
pub struct Event {
    /// Event key, matched against listener interest sets
    pub key: String,
    /// Key-value arguments
    pub properties: Properties,
}

impl Event {
    /// Create an event with no arguments
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            properties: Properties::new(),
        }
    }

    /// Add an argument (builder pattern)
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl std::any::Any) -> Self {
        self.properties.put(key, value);
        self
    }
}

/// Receives dispatched events
pub trait EventListener {
    /// Handle an event whose key matched this listener's interest set
    fn on_event(&mut self, event: &Event);
}

struct ListenerEntry {
    interests: HashSet<String>,
    listener: Box<dyn EventListener>,
    active: bool,
}

/// Queue-then-flush event dispatcher
///
/// `submit` buffers events; `run` flushes pending listener changes, then
/// dispatches every buffered event, in submission order, to each interested
/// listener in registration order. An empty interest set means the listener
/// receives every event.
#[derive(Default)]
pub struct EventManager {
    listeners: SlotMap<ListenerId, ListenerEntry>,
    order: Vec<ListenerId>,
    queued_events: VecDeque<Event>,
    pending_activate: Vec<ListenerId>,
    pending_remove: Vec<ListenerId>,
    running: bool,
}

impl EventManager {
    /// Create an empty event manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for dispatch on the next `run`
    pub fn submit(&mut self, event: Event) {
        self.queued_events.push_back(event);
    }

    /// Register a listener for the given event keys (empty set = all events)
    ///
    /// Takes effect immediately when idle; while running, the listener
    /// becomes active at the start of the next `run`.
    pub fn add_listener(
        &mut self,
        interests: HashSet<String>,
        listener: Box<dyn EventListener>,
    ) -> ListenerId {
        let id = self.listeners.insert(ListenerEntry {
            interests,
            listener,
            active: !self.running,
        });
        self.order.push(id);
        if self.running {
            self.pending_activate.push(id);
        }
        id
    }

    /// Remove a listener
    ///
    /// Deferred to the start of the next `run` when invoked mid-dispatch.
    pub fn remove_listener(&mut self, id: ListenerId) {
        if self.running {
            self.pending_remove.push(id);
        } else {
            self.erase(id);
        }
    }

    /// Number of active listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.values().filter(|entry| entry.active).count()
    }

    /// Dispatch all queued events to interested listeners
    pub fn run(&mut self) {
        self.flush_pending();
        self.running = true;

        // Snapshot the queue: anything submitted while dispatching waits
        // for the next run
        let mut batch = std::mem::take(&mut self.queued_events);
        for event in batch.drain(..) {
            log::trace!("dispatching event '{}'", event.key);
            for id in &self.order {
                let Some(entry) = self.listeners.get_mut(*id) else {
                    continue;
                };
                if !entry.active {
                    continue;
                }
                if entry.interests.is_empty() || entry.interests.contains(&event.key) {
                    entry.listener.on_event(&event);
                }
            }
        }

        self.running = false;
    }

    /// Drop all queued events and pending listener changes
    pub fn clear_queue(&mut self) {
        self.queued_events.clear();
    }

    fn flush_pending(&mut self) {
        for id in std::mem::take(&mut self.pending_remove) {
            self.erase(id);
        }
        for id in std::mem::take(&mut self.pending_activate) {
            if let Some(entry) = self.listeners.get_mut(id) {
                entry.active = true;
            }
        }
    }

    fn erase(&mut self, id: ListenerId) {
        self.listeners.remove(id);
        self.order.retain(|listener| *listener != id);
    }
}
