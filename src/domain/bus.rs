//! Broadcast channel for domain events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. The service
//! layer publishes a [`DomainEvent`] after every successful mutation; the
//! optional PostgreSQL audit writer subscribes and appends each one to the
//! event log table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use super::{AreaId, EventId, UserId};

/// Domain event emitted after every successful state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Emitted when a new parking area is created.
    AreaCreated {
        /// Area identifier.
        area_id: AreaId,
        /// Area label.
        name: String,
        /// Total slot count.
        max_capacity: u32,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a park transaction completes.
    BicycleParked {
        /// Recorded event identifier.
        event_id: EventId,
        /// Area the bicycle was parked in.
        area_id: AreaId,
        /// User who parked.
        user_id: UserId,
        /// Free slots remaining after the park.
        residual_capacity: u32,
        /// Transaction timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a leave transaction completes.
    BicycleLeft {
        /// Recorded event identifier.
        event_id: EventId,
        /// Area the bicycle left.
        area_id: AreaId,
        /// User who left.
        user_id: UserId,
        /// Free slots remaining after the leave.
        residual_capacity: u32,
        /// Transaction timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a new user signs up.
    UserRegistered {
        /// User identifier.
        user_id: UserId,
        /// Chosen username.
        username: String,
        /// Signup timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::AreaCreated { .. } => "area_created",
            Self::BicycleParked { .. } => "bicycle_parked",
            Self::BicycleLeft { .. } => "bicycle_left",
            Self::UserRegistered { .. } => "user_registered",
        }
    }
}

/// Broadcast bus for [`DomainEvent`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity.
/// When the ring buffer is full, the oldest events are dropped for lagging
/// receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event. If there
    /// are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: DomainEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
