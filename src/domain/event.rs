//! Immutable park/leave event records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use geo::Point;
use serde::{Deserialize, Serialize};

use super::{AreaId, EventId, UserId};

/// Kind of a parking event: a closed two-variant tag.
///
/// Park and Leave are independent capacity deltas; a Leave is not correlated
/// to any prior Park session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A bicycle was parked; consumes one slot.
    Park,
    /// A bicycle left; frees one slot.
    Leave,
}

impl EventKind {
    /// Returns the wire string for this kind (`"park"` / `"leave"`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Park => "park",
            Self::Leave => "leave",
        }
    }

    /// Returns the opposite kind, used for ledger compensation.
    #[must_use]
    pub const fn inverse(&self) -> Self {
        match self {
            Self::Park => Self::Leave,
            Self::Leave => Self::Park,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "park" => Ok(Self::Park),
            "leave" => Ok(Self::Leave),
            other => Err(format!("unknown event kind: {other}")),
        }
    }
}

/// One append-only log entry recording a park or leave signal.
///
/// Created once by the event log and never mutated or deleted afterwards.
/// `location` is the GPS fix reported by the client, not the area centroid.
#[derive(Debug, Clone)]
pub struct ParkingEvent {
    /// Strictly increasing identifier assigned at append time.
    pub id: EventId,
    /// Park or leave.
    pub kind: EventKind,
    /// Reported WGS84 lon/lat fix.
    pub location: Point<f64>,
    /// Originating user.
    pub user_id: UserId,
    /// Area the location resolved to.
    pub area_id: AreaId,
    /// Event timestamp; ingestion time when the signal carried none.
    pub start_time: DateTime<Utc>,
    /// Optional completed-session end, carried through verbatim.
    pub end_time: Option<DateTime<Utc>>,
}
