//! Parking area aggregate with bounded capacity accounting.

use chrono::{DateTime, Utc};
use geo::Polygon;

use super::AreaId;
use crate::error::GatewayError;

/// A polygon-bounded parking zone with finite bicycle capacity.
///
/// The boundary is a closed polygon in WGS84 (longitude/latitude, SRID 4326)
/// and is immutable after creation, as is `max_capacity`. The only mutable
/// field is `residual_capacity`, and only [`ParkingArea::try_park`] and
/// [`ParkingArea::try_leave`] may touch it; both enforce the invariant
/// `0 <= residual_capacity <= max_capacity`.
#[derive(Debug, Clone)]
pub struct ParkingArea {
    /// Unique area identifier (immutable after creation).
    pub id: AreaId,

    /// Unique human-readable label.
    pub name: String,

    /// Closed boundary polygon, WGS84 lon/lat.
    pub boundary: Polygon<f64>,

    /// Total number of slots, fixed at creation.
    pub max_capacity: u32,

    /// Free slots remaining. Mutated only through the capacity guards.
    pub residual_capacity: u32,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ParkingArea {
    /// Creates a new area with all slots free.
    #[must_use]
    pub fn new(id: AreaId, name: String, boundary: Polygon<f64>, max_capacity: u32) -> Self {
        Self {
            id,
            name,
            boundary,
            max_capacity,
            residual_capacity: max_capacity,
            created_at: Utc::now(),
        }
    }

    /// Consumes one free slot.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AreaFull`] when no slot is free; the area is
    /// left unchanged.
    pub fn try_park(&mut self) -> Result<(), GatewayError> {
        if self.residual_capacity == 0 {
            return Err(GatewayError::AreaFull(self.id));
        }
        self.residual_capacity -= 1;
        Ok(())
    }

    /// Releases one slot.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AreaEmpty`] when every slot is already free;
    /// the area is left unchanged.
    pub fn try_leave(&mut self) -> Result<(), GatewayError> {
        if self.residual_capacity >= self.max_capacity {
            return Err(GatewayError::AreaEmpty(self.id));
        }
        self.residual_capacity += 1;
        Ok(())
    }

    /// Returns `true` when no slot is free.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.residual_capacity == 0
    }

    /// Occupancy as a percentage of `max_capacity`.
    ///
    /// Defined as `0.0` when `max_capacity == 0`.
    #[must_use]
    pub fn occupancy_percentage(&self) -> f64 {
        if self.max_capacity == 0 {
            return 0.0;
        }
        let occupied = f64::from(self.max_capacity - self.residual_capacity);
        occupied / f64::from(self.max_capacity) * 100.0
    }
}

/// Point-in-time copy of an area's state, returned by the store so callers
/// never hold a reference into the locked entry.
#[derive(Debug, Clone)]
pub struct AreaSnapshot {
    /// Area identifier.
    pub id: AreaId,
    /// Human-readable label.
    pub name: String,
    /// Boundary polygon, WGS84 lon/lat.
    pub boundary: Polygon<f64>,
    /// Total slot count.
    pub max_capacity: u32,
    /// Free slots at snapshot time.
    pub residual_capacity: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl AreaSnapshot {
    /// Occupancy as a percentage of `max_capacity`, `0.0` when max is zero.
    #[must_use]
    pub fn occupancy_percentage(&self) -> f64 {
        if self.max_capacity == 0 {
            return 0.0;
        }
        let occupied = f64::from(self.max_capacity - self.residual_capacity);
        occupied / f64::from(self.max_capacity) * 100.0
    }
}

impl From<&ParkingArea> for AreaSnapshot {
    fn from(area: &ParkingArea) -> Self {
        Self {
            id: area.id,
            name: area.name.clone(),
            boundary: area.boundary.clone(),
            max_capacity: area.max_capacity,
            residual_capacity: area.residual_capacity,
            created_at: area.created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 0.0, y: 10.0),
            (x: 10.0, y: 10.0),
            (x: 10.0, y: 0.0),
        ]
    }

    #[test]
    fn park_decrements_until_full() {
        let mut area = ParkingArea::new(AreaId::new(1), "pza".to_string(), square(), 2);
        assert!(area.try_park().is_ok());
        assert!(area.try_park().is_ok());
        assert_eq!(area.residual_capacity, 0);
        assert!(area.is_full());

        let rejected = area.try_park();
        assert!(matches!(rejected, Err(GatewayError::AreaFull(_))));
        assert_eq!(area.residual_capacity, 0);
    }

    #[test]
    fn leave_rejected_when_all_slots_free() {
        let mut area = ParkingArea::new(AreaId::new(1), "pza".to_string(), square(), 3);
        let rejected = area.try_leave();
        assert!(matches!(rejected, Err(GatewayError::AreaEmpty(_))));
        assert_eq!(area.residual_capacity, 3);
    }

    #[test]
    fn leave_restores_a_slot() {
        let mut area = ParkingArea::new(AreaId::new(1), "pza".to_string(), square(), 3);
        let _ = area.try_park();
        assert!(area.try_leave().is_ok());
        assert_eq!(area.residual_capacity, 3);
    }

    #[test]
    fn occupancy_percentage_half_full() {
        let mut area = ParkingArea::new(AreaId::new(1), "pza".to_string(), square(), 4);
        let _ = area.try_park();
        let _ = area.try_park();
        assert!((area.occupancy_percentage() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn occupancy_percentage_zero_capacity_is_zero() {
        let area = ParkingArea::new(AreaId::new(1), "pza".to_string(), square(), 0);
        assert!((area.occupancy_percentage() - 0.0).abs() < f64::EPSILON);
        // A zero-capacity area is also full.
        assert!(area.is_full());
    }

    #[test]
    fn snapshot_copies_current_state() {
        let mut area = ParkingArea::new(AreaId::new(7), "pza".to_string(), square(), 5);
        let _ = area.try_park();
        let snap = AreaSnapshot::from(&area);
        assert_eq!(snap.id, AreaId::new(7));
        assert_eq!(snap.residual_capacity, 4);
        assert_eq!(snap.max_capacity, 5);
    }
}
