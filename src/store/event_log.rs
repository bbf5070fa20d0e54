//! Append-only log of parking events.
//!
//! [`EventLog`] is the event recorder: it assigns strictly increasing ids,
//! verifies that the referenced user and area exist, and appends the record
//! immutably. No update or delete operation is exposed.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use geo::Point;
use tokio::sync::RwLock;

use super::area_store::AreaRegistry;
use super::user_store::UserRegistry;
use crate::domain::{AreaId, EventId, EventKind, ParkingEvent, UserId};
use crate::error::GatewayError;

/// Append-only parking event recorder with read accessors.
///
/// Holds explicit handles to the user and area stores (passed at
/// construction) so foreign references can be verified before a record is
/// appended.
#[derive(Debug)]
pub struct EventLog {
    users: Arc<UserRegistry>,
    areas: Arc<AreaRegistry>,
    events: RwLock<Vec<ParkingEvent>>,
    next_id: AtomicI64,
}

impl EventLog {
    /// Creates an empty log over the given user and area stores.
    #[must_use]
    pub fn new(users: Arc<UserRegistry>, areas: Arc<AreaRegistry>) -> Self {
        Self {
            users,
            areas,
            events: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Appends a new immutable event record.
    ///
    /// `start_time` defaults to ingestion time when absent.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownUser`] when the user was never
    /// registered and [`GatewayError::AreaNotFound`] when the area does not
    /// exist. On error nothing is appended.
    pub async fn record(
        &self,
        kind: EventKind,
        location: Point<f64>,
        user_id: UserId,
        area_id: AreaId,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<ParkingEvent, GatewayError> {
        if !self.users.contains(user_id).await {
            return Err(GatewayError::UnknownUser(*user_id.as_uuid()));
        }
        if !self.areas.contains(area_id).await {
            return Err(GatewayError::AreaNotFound(area_id));
        }

        // Id assignment happens under the write guard so log order and id
        // order never diverge.
        let mut events = self.events.write().await;
        let id = EventId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let event = ParkingEvent {
            id,
            kind,
            location,
            user_id,
            area_id,
            start_time: start_time.unwrap_or_else(Utc::now),
            end_time,
        };
        events.push(event.clone());
        Ok(event)
    }

    /// Returns the event with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`] for an unknown id.
    pub async fn get(&self, id: EventId) -> Result<ParkingEvent, GatewayError> {
        let events = self.events.read().await;
        events
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(GatewayError::EventNotFound(id.get()))
    }

    /// Returns every recorded event in append order.
    pub async fn all(&self) -> Vec<ParkingEvent> {
        self.events.read().await.clone()
    }

    /// Returns every event originated by the given user.
    pub async fn by_user(&self, user_id: UserId) -> Vec<ParkingEvent> {
        let events = self.events.read().await;
        events.iter().filter(|e| e.user_id == user_id).cloned().collect()
    }

    /// Returns every event recorded against the given area.
    pub async fn by_area(&self, area_id: AreaId) -> Vec<ParkingEvent> {
        let events = self.events.read().await;
        events.iter().filter(|e| e.area_id == area_id).cloned().collect()
    }

    /// Returns every event of the given kind.
    pub async fn by_kind(&self, kind: EventKind) -> Vec<ParkingEvent> {
        let events = self.events.read().await;
        events.iter().filter(|e| e.kind == kind).cloned().collect()
    }

    /// Returns the `limit` most recent events, ordered by start time
    /// descending (ties broken by id descending).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] when `limit` is zero.
    pub async fn recent(&self, limit: usize) -> Result<Vec<ParkingEvent>, GatewayError> {
        if limit == 0 {
            return Err(GatewayError::InvalidInput(
                "recent-events limit must be greater than zero".to_string(),
            ));
        }
        let events = self.events.read().await;
        let mut sorted: Vec<ParkingEvent> = events.clone();
        sorted.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.id.cmp(&a.id)));
        sorted.truncate(limit);
        Ok(sorted)
    }

    /// Returns the number of recorded events.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Returns `true` when no event has been recorded.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}
