//! # velopark-gateway
//!
//! REST API gateway for tracking bicycle parking areas and park/leave
//! events.
//!
//! Parking areas are geographic polygons (WGS84) with finite capacity.
//! Inbound park/leave signals carry a GPS fix; the service resolves the
//! containing area, applies a bounded capacity change, and appends an
//! immutable event record as one logically atomic transaction.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── ParkingService (service/)   — transaction coordinator
//!     ├── EventBus (domain/)
//!     │
//!     ├── AreaRegistry (store/)       — capacity ledger + spatial index
//!     ├── EventLog (store/)           — append-only event recorder
//!     ├── UserRegistry (store/)
//!     │
//!     └── PostgreSQL audit trail (persistence/, optional)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod projection;
pub mod service;
pub mod store;
