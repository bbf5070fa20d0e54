//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::ParkingService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Parking service for all business logic.
    pub parking_service: Arc<ParkingService>,
    /// Event bus carrying domain events.
    pub event_bus: EventBus,
}
