//! Domain layer: core types, identifiers, and the event bus.
//!
//! This module contains the server-side domain model: parking areas with
//! bounded capacity, immutable park/leave event records, users, inbound
//! signals, and the broadcast bus carrying mutation events.

pub mod area;
pub mod bus;
pub mod event;
pub mod ids;
pub mod signal;
pub mod user;

pub use area::{AreaSnapshot, ParkingArea};
pub use bus::{DomainEvent, EventBus};
pub use event::{EventKind, ParkingEvent};
pub use ids::{AreaId, EventId, UserId};
pub use signal::ParkingSignal;
pub use user::User;
