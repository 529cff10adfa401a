// src/events/mod.rs
//
// Internal event system - public API
//
// The type-erased handler alias stays private to the bus module.

pub mod bus;
pub mod types;

pub use bus::{EventBus, EventLogEntry};
pub use types::{DomainEvent, MovieAdded, MovieDeleted};

/// Initialize a new event bus
pub fn create_event_bus() -> EventBus {
    EventBus::new()
}
