//! Shared Events Crate
//!
//! Event envelope and NATS client wrapper for event-driven communication
//! between the WMS core and its collaborators.
//!
//! ## Features
//!
//! - Generic event envelope with serialization support
//! - NATS client wrapper with connection management
//! - Async publish/subscribe methods
//! - Error handling for event operations

pub mod events;
pub mod nats;

pub use events::*;
pub use nats::*;
