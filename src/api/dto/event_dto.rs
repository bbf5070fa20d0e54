//! DTOs for parking event endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::AreaDto;
use crate::domain::{AreaId, EventId, EventKind, ParkingEvent, ParkingSignal, UserId};
use crate::projection;

/// Request body for `POST /events/parking`: an inbound park/leave signal
/// from a client device.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ParkingSignalRequest {
    /// Originating user.
    #[schema(value_type = uuid::Uuid)]
    pub user_id: UserId,
    /// Reported longitude, WGS84 degrees.
    pub longitude: f64,
    /// Reported latitude, WGS84 degrees.
    pub latitude: f64,
    /// Park or leave.
    pub kind: EventKind,
    /// Client-supplied event time; ingestion time is used when absent.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// Optional completed-session end time.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

impl ParkingSignalRequest {
    /// Converts the request into a domain signal.
    #[must_use]
    pub fn into_signal(self) -> ParkingSignal {
        ParkingSignal {
            user_id: self.user_id,
            longitude: self.longitude,
            latitude: self.latitude,
            kind: self.kind,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// Query parameters for `GET /events/recent`.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct RecentParams {
    /// Number of events to return, most recent first. Defaults to 10;
    /// must be greater than zero.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

/// Flat parking event projection returned by read endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventDto {
    /// Event identifier.
    #[schema(value_type = i64)]
    pub id: EventId,
    /// Park or leave.
    pub kind: EventKind,
    /// Reported fix as a GeoJSON Point geometry.
    #[schema(value_type = Object)]
    pub location: geojson::Geometry,
    /// Originating user.
    #[schema(value_type = uuid::Uuid)]
    pub user_id: UserId,
    /// Resolved area.
    #[schema(value_type = i64)]
    pub area_id: AreaId,
    /// Event timestamp.
    pub start_time: DateTime<Utc>,
    /// Optional completed-session end.
    pub end_time: Option<DateTime<Utc>>,
}

impl From<&ParkingEvent> for EventDto {
    fn from(event: &ParkingEvent) -> Self {
        Self {
            id: event.id,
            kind: event.kind,
            location: projection::point_geometry(&event.location),
            user_id: event.user_id,
            area_id: event.area_id,
            start_time: event.start_time,
            end_time: event.end_time,
        }
    }
}

/// Response body for a completed parking transaction: the recorded event
/// plus the updated area snapshot.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SignalResponse {
    /// The immutable event appended to the log.
    pub event: EventDto,
    /// Area state immediately after the capacity change.
    pub area: AreaDto,
}
