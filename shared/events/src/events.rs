//! Event envelope for the WMS platform
//!
//! Domain event payloads are defined by the service core; this module only
//! provides the wire envelope and subject naming shared by publishers and
//! consumers.

use serde::{Deserialize, Serialize};

/// Subject prefix for every event published by the WMS core
pub const WMS_SUBJECT_PREFIX: &str = "wms.events";

/// Build the NATS subject for an event kind, e.g. `wms.events.location.created`
pub fn subject_for(event_type: &str) -> String {
    format!("{}.{}", WMS_SUBJECT_PREFIX, event_type)
}

/// Event envelope for NATS messaging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope<T> {
    /// Event type identifier
    pub event_type: String,
    /// Event timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Envelope version for backward compatibility
    pub version: String,
    /// Event data
    pub data: T,
}

impl<T> EventEnvelope<T> {
    pub fn new(event_type: &str, data: T) -> Self {
        Self {
            event_type: event_type.to_string(),
            timestamp: chrono::Utc::now(),
            version: "1.0".to_string(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subjects_are_prefixed() {
        assert_eq!(subject_for("stock.level_below_minimum"), "wms.events.stock.level_below_minimum");
    }
}
