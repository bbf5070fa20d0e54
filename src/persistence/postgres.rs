//! PostgreSQL implementation of the audit event log.
//!
//! The in-memory stores stay authoritative for the capacity core; this
//! layer is a write-behind trail fed from the [`EventBus`] so operators
//! can replay or inspect every mutation after the fact.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::task::JoinHandle;

use super::models::StoredDomainEvent;
use crate::domain::EventBus;
use crate::error::GatewayError;

/// PostgreSQL-backed audit log using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresAuditLog {
    pool: PgPool,
}

impl PostgresAuditLog {
    /// Creates a new audit log with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends one domain event to the audit table.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::Storage`] on database failure.
    pub async fn append(
        &self,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<i64, GatewayError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO domain_events (event_type, payload) VALUES ($1, $2) RETURNING id",
        )
        .bind(event_type)
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::Storage(e.to_string()))?;

        Ok(row)
    }

    /// Loads audit rows created after the given timestamp, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::Storage`] on database failure.
    pub async fn load_after(
        &self,
        after: DateTime<Utc>,
    ) -> Result<Vec<StoredDomainEvent>, GatewayError> {
        let rows = sqlx::query_as::<_, (i64, String, serde_json::Value, DateTime<Utc>)>(
            "SELECT id, event_type, payload, created_at FROM domain_events \
             WHERE created_at > $1 ORDER BY created_at ASC",
        )
        .bind(after)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::Storage(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, event_type, payload, created_at)| StoredDomainEvent {
                id,
                event_type,
                payload,
                created_at,
            })
            .collect())
    }

    /// Deletes audit rows older than the given number of days.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::Storage`] on database failure.
    pub async fn delete_older_than(&self, days: u64) -> Result<u64, GatewayError> {
        let cutoff = Utc::now() - chrono::Duration::days(i64::try_from(days).unwrap_or(i64::MAX));

        let result = sqlx::query("DELETE FROM domain_events WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::Storage(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

/// Spawns the write-behind task: subscribes to the bus and appends every
/// domain event to the audit table. Lagged receivers skip dropped events
/// with a warning rather than stopping the writer.
pub fn spawn_audit_writer(audit: PostgresAuditLog, bus: &EventBus) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let payload = match serde_json::to_value(&event) {
                        Ok(payload) => payload,
                        Err(e) => {
                            tracing::error!(error = %e, "failed to serialize domain event");
                            continue;
                        }
                    };
                    if let Err(e) = audit.append(event.event_type_str(), &payload).await {
                        tracing::error!(error = %e, "failed to append audit event");
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "audit writer lagged behind the event bus");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Spawns the retention task: deletes audit rows older than
/// `cleanup_after_days` once per day. Returns `None` when retention is
/// disabled (`cleanup_after_days == 0`).
pub fn spawn_retention_task(
    audit: PostgresAuditLog,
    cleanup_after_days: u64,
) -> Option<JoinHandle<()>> {
    if cleanup_after_days == 0 {
        return None;
    }
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(24 * 60 * 60));
        loop {
            ticker.tick().await;
            match audit.delete_older_than(cleanup_after_days).await {
                Ok(deleted) if deleted > 0 => {
                    tracing::info!(deleted, "pruned old audit events");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "audit retention sweep failed");
                }
            }
        }
    }))
}
