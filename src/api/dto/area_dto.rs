//! DTOs for parking area endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AreaId, AreaSnapshot, UserId};
use crate::projection;

/// Request body for `POST /areas`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAreaRequest {
    /// Unique human-readable label.
    pub name: String,
    /// Boundary as a GeoJSON Polygon geometry (lon/lat, WGS84).
    #[schema(value_type = Object)]
    pub boundary: geojson::Geometry,
    /// Total slot count, fixed at creation.
    pub max_capacity: u32,
}

/// Request body for the direct `POST /areas/{id}/park` and
/// `POST /areas/{id}/leave` operations. The event kind comes from the
/// route; the reported fix is still recorded verbatim.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AreaSignalRequest {
    /// Originating user.
    #[schema(value_type = uuid::Uuid)]
    pub user_id: UserId,
    /// Reported longitude, WGS84 degrees.
    pub longitude: f64,
    /// Reported latitude, WGS84 degrees.
    pub latitude: f64,
    /// Client-supplied event time; ingestion time is used when absent.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// Optional completed-session end time.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

/// Flat parking area projection returned by read endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AreaDto {
    /// Area identifier.
    #[schema(value_type = i64)]
    pub id: AreaId,
    /// Human-readable label.
    pub name: String,
    /// Boundary as a GeoJSON Polygon geometry.
    #[schema(value_type = Object)]
    pub boundary: geojson::Geometry,
    /// Total slot count.
    pub max_capacity: u32,
    /// Free slots remaining.
    pub residual_capacity: u32,
    /// Occupancy as a percentage of `max_capacity`.
    pub occupancy_percentage: f64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&AreaSnapshot> for AreaDto {
    fn from(area: &AreaSnapshot) -> Self {
        Self {
            id: area.id,
            name: area.name.clone(),
            boundary: projection::polygon_geometry(&area.boundary),
            max_capacity: area.max_capacity,
            residual_capacity: area.residual_capacity,
            occupancy_percentage: area.occupancy_percentage(),
            created_at: area.created_at,
        }
    }
}
