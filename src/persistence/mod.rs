//! Persistence layer: PostgreSQL audit trail of domain events.
//!
//! Optional write-behind storage. The concrete implementation uses
//! `sqlx::PgPool` for async PostgreSQL access; see
//! [`postgres::spawn_audit_writer`] for the bus-fed writer task.

pub mod models;
pub mod postgres;

pub use postgres::PostgresAuditLog;
