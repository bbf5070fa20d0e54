//! Read-only projections over areas and events.
//!
//! Pure functions rendering GeoJSON Features / FeatureCollections and the
//! aggregate capacity summary. Nothing here mutates state; callers are
//! expected to pass snapshots taken from the stores (multi-area aggregates
//! should come from [`crate::store::AreaRegistry::snapshot_all`], which is
//! consistent).

use geojson::{Feature, FeatureCollection, Geometry};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::domain::{AreaSnapshot, ParkingEvent};

/// Renders an area boundary as a GeoJSON Polygon geometry (lon/lat order,
/// WGS84).
#[must_use]
pub fn polygon_geometry(boundary: &geo::Polygon<f64>) -> Geometry {
    Geometry::new(geojson::Value::from(boundary))
}

/// Renders a reported fix as a GeoJSON Point geometry.
#[must_use]
pub fn point_geometry(location: &geo::Point<f64>) -> Geometry {
    Geometry::new(geojson::Value::from(location))
}

/// Renders one area as a GeoJSON Feature with non-geometry fields in
/// `properties`.
#[must_use]
pub fn area_feature(area: &AreaSnapshot) -> Feature {
    let mut properties = Map::new();
    properties.insert("id".to_string(), json!(area.id));
    properties.insert("name".to_string(), json!(area.name));
    properties.insert("max_capacity".to_string(), json!(area.max_capacity));
    properties.insert(
        "residual_capacity".to_string(),
        json!(area.residual_capacity),
    );
    properties.insert(
        "occupancy_percentage".to_string(),
        json!(area.occupancy_percentage()),
    );

    Feature {
        bbox: None,
        geometry: Some(polygon_geometry(&area.boundary)),
        id: Some(geojson::feature::Id::Number(area.id.get().into())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Renders one event as a GeoJSON Feature.
#[must_use]
pub fn event_feature(event: &ParkingEvent) -> Feature {
    let mut properties = Map::new();
    properties.insert("id".to_string(), json!(event.id));
    properties.insert("kind".to_string(), json!(event.kind));
    properties.insert("user_id".to_string(), json!(event.user_id));
    properties.insert("area_id".to_string(), json!(event.area_id));
    properties.insert(
        "start_time".to_string(),
        json!(event.start_time.to_rfc3339()),
    );
    properties.insert(
        "end_time".to_string(),
        event
            .end_time
            .map_or(Value::Null, |t| json!(t.to_rfc3339())),
    );

    Feature {
        bbox: None,
        geometry: Some(point_geometry(&event.location)),
        id: Some(geojson::feature::Id::Number(event.id.get().into())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Renders a set of areas as a GeoJSON FeatureCollection.
#[must_use]
pub fn area_collection(areas: &[AreaSnapshot]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: areas.iter().map(area_feature).collect(),
        foreign_members: None,
    }
}

/// Renders a set of events as a GeoJSON FeatureCollection.
#[must_use]
pub fn event_collection(events: &[ParkingEvent]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: events.iter().map(event_feature).collect(),
        foreign_members: None,
    }
}

/// Aggregate capacity numbers across every area.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CapacitySummary {
    /// Number of areas.
    pub total_areas: usize,
    /// Sum of every area's maximum capacity.
    pub total_max_capacity: u64,
    /// Sum of every area's free slots.
    pub total_residual_capacity: u64,
    /// Occupied slots across all areas.
    pub total_occupied: u64,
    /// Occupancy across all areas as a percentage; `0.0` when there is no
    /// capacity at all.
    pub overall_occupancy_percentage: f64,
}

/// Computes the aggregate summary over a consistent set of snapshots.
#[must_use]
pub fn capacity_summary(areas: &[AreaSnapshot]) -> CapacitySummary {
    let total_max_capacity: u64 = areas.iter().map(|a| u64::from(a.max_capacity)).sum();
    let total_residual_capacity: u64 =
        areas.iter().map(|a| u64::from(a.residual_capacity)).sum();
    let total_occupied = total_max_capacity - total_residual_capacity;

    #[allow(clippy::cast_precision_loss)]
    let overall_occupancy_percentage = if total_max_capacity == 0 {
        0.0
    } else {
        total_occupied as f64 / total_max_capacity as f64 * 100.0
    };

    CapacitySummary {
        total_areas: areas.len(),
        total_max_capacity,
        total_residual_capacity,
        total_occupied,
        overall_occupancy_percentage,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{AreaId, EventId, EventKind, UserId};
    use chrono::Utc;
    use geo::{Point, polygon};

    fn snapshot(id: i64, max: u32, residual: u32) -> AreaSnapshot {
        AreaSnapshot {
            id: AreaId::new(id),
            name: format!("area-{id}"),
            boundary: polygon![
                (x: 0.0, y: 0.0),
                (x: 0.0, y: 10.0),
                (x: 10.0, y: 10.0),
                (x: 10.0, y: 0.0),
            ],
            max_capacity: max,
            residual_capacity: residual,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn area_feature_shape() {
        let feature = area_feature(&snapshot(1, 10, 4));

        let Some(geometry) = feature.geometry else {
            panic!("missing geometry");
        };
        assert!(matches!(geometry.value, geojson::Value::Polygon(_)));

        let Some(props) = feature.properties else {
            panic!("missing properties");
        };
        assert_eq!(props.get("name"), Some(&json!("area-1")));
        assert_eq!(props.get("residual_capacity"), Some(&json!(4)));
        assert_eq!(props.get("occupancy_percentage"), Some(&json!(60.0)));
    }

    #[test]
    fn event_feature_is_point_with_kind() {
        let event = ParkingEvent {
            id: EventId::new(3),
            kind: EventKind::Park,
            location: Point::new(9.19, 45.46),
            user_id: UserId::new(),
            area_id: AreaId::new(1),
            start_time: Utc::now(),
            end_time: None,
        };
        let feature = event_feature(&event);

        let Some(geometry) = feature.geometry else {
            panic!("missing geometry");
        };
        let geojson::Value::Point(coords) = geometry.value else {
            panic!("expected point geometry");
        };
        // Longitude first, latitude second.
        assert!((coords.first().copied().unwrap_or_default() - 9.19).abs() < 1e-9);

        let Some(props) = feature.properties else {
            panic!("missing properties");
        };
        assert_eq!(props.get("kind"), Some(&json!("park")));
        assert_eq!(props.get("end_time"), Some(&Value::Null));
    }

    #[test]
    fn collection_wraps_all_features() {
        let areas = vec![snapshot(1, 5, 5), snapshot(2, 3, 0)];
        let collection = area_collection(&areas);
        assert_eq!(collection.features.len(), 2);

        let json = serde_json::to_value(&collection).unwrap_or_default();
        assert_eq!(json.get("type"), Some(&json!("FeatureCollection")));
    }

    #[test]
    fn summary_aggregates_capacity() {
        let areas = vec![snapshot(1, 10, 4), snapshot(2, 6, 6)];
        let summary = capacity_summary(&areas);

        assert_eq!(summary.total_areas, 2);
        assert_eq!(summary.total_max_capacity, 16);
        assert_eq!(summary.total_residual_capacity, 10);
        assert_eq!(summary.total_occupied, 6);
        assert!((summary.overall_occupancy_percentage - 37.5).abs() < 1e-9);
    }

    #[test]
    fn summary_of_no_capacity_is_zero_percent() {
        let summary = capacity_summary(&[snapshot(1, 0, 0)]);
        assert!((summary.overall_occupancy_percentage - 0.0).abs() < f64::EPSILON);
    }
}
