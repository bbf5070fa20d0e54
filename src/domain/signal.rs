//! Inbound park/leave signals and their field validation.

use chrono::{DateTime, Utc};
use geo::Point;

use super::{EventKind, UserId};
use crate::error::GatewayError;

/// A parking or leave signal as reported by a client device.
///
/// This is the coordinator's sole input: the `Received` state of the
/// transaction. [`ParkingSignal::validate`] implements the fail-fast check
/// that gates every further step.
#[derive(Debug, Clone)]
pub struct ParkingSignal {
    /// Originating user.
    pub user_id: UserId,
    /// Reported longitude, WGS84 degrees.
    pub longitude: f64,
    /// Reported latitude, WGS84 degrees.
    pub latitude: f64,
    /// Park or leave.
    pub kind: EventKind,
    /// Client-supplied event time; ingestion time is used when absent.
    pub start_time: Option<DateTime<Utc>>,
    /// Optional completed-session end time, carried through verbatim.
    pub end_time: Option<DateTime<Utc>>,
}

impl ParkingSignal {
    /// Checks that the reported coordinate is a finite WGS84 position.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] when the longitude is outside
    /// `[-180, 180]`, the latitude outside `[-90, 90]`, or either is NaN or
    /// infinite.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(GatewayError::InvalidInput(format!(
                "longitude out of range: {}",
                self.longitude
            )));
        }
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(GatewayError::InvalidInput(format!(
                "latitude out of range: {}",
                self.latitude
            )));
        }
        Ok(())
    }

    /// Returns the reported fix as a geometry point (lon/lat order).
    #[must_use]
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn signal(longitude: f64, latitude: f64) -> ParkingSignal {
        ParkingSignal {
            user_id: UserId::new(),
            longitude,
            latitude,
            kind: EventKind::Park,
            start_time: None,
            end_time: None,
        }
    }

    #[test]
    fn valid_coordinate_passes() {
        assert!(signal(9.19, 45.46).validate().is_ok());
    }

    #[test]
    fn longitude_out_of_range_rejected() {
        let err = signal(181.0, 0.0).validate();
        assert!(matches!(err, Err(GatewayError::InvalidInput(_))));
    }

    #[test]
    fn latitude_out_of_range_rejected() {
        let err = signal(0.0, -90.5).validate();
        assert!(matches!(err, Err(GatewayError::InvalidInput(_))));
    }

    #[test]
    fn nan_coordinate_rejected() {
        let err = signal(f64::NAN, 0.0).validate();
        assert!(matches!(err, Err(GatewayError::InvalidInput(_))));
    }

    #[test]
    fn point_is_lon_lat_ordered() {
        let p = signal(9.19, 45.46).point();
        assert!((p.x() - 9.19).abs() < f64::EPSILON);
        assert!((p.y() - 45.46).abs() < f64::EPSILON);
    }
}
