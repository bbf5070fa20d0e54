//! Service layer: business logic orchestration.
//!
//! [`ParkingService`] coordinates the resolve → ledger → record transaction
//! for every inbound signal and emits events through the
//! [`crate::domain::EventBus`].

pub mod parking_service;

pub use parking_service::{ParkingService, SignalOutcome};
