//! Database models for the audit event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored audit row from the `domain_events` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDomainEvent {
    /// Auto-increment row ID.
    pub id: i64,
    /// Event type discriminator (e.g. `"bicycle_parked"`).
    pub event_type: String,
    /// JSONB payload with event-specific data.
    pub payload: serde_json::Value,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}
