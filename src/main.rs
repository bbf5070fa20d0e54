//! velopark-gateway server entry point.
//!
//! Starts the Axum HTTP server with the parking REST endpoints.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use velopark_gateway::api;
use velopark_gateway::app_state::AppState;
use velopark_gateway::config::GatewayConfig;
use velopark_gateway::domain::EventBus;
use velopark_gateway::persistence::PostgresAuditLog;
use velopark_gateway::persistence::postgres::{spawn_audit_writer, spawn_retention_task};
use velopark_gateway::service::ParkingService;
use velopark_gateway::store::{AreaRegistry, EventLog, UserRegistry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting velopark-gateway");

    // Build store layer with explicit handles
    let areas = Arc::new(AreaRegistry::new());
    let users = Arc::new(UserRegistry::new());
    let log = Arc::new(EventLog::new(Arc::clone(&users), Arc::clone(&areas)));
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Build service layer
    let parking_service = Arc::new(ParkingService::new(
        areas,
        users,
        log,
        event_bus.clone(),
    ));

    // Optional write-behind audit trail
    if config.persistence_enabled {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database_connect_timeout_secs,
            ))
            .connect(&config.database_url)
            .await?;
        let audit = PostgresAuditLog::new(pool);

        if config.event_log_enabled {
            let _writer = spawn_audit_writer(audit.clone(), &event_bus);
            tracing::info!("audit event writer started");
        }
        if let Some(_retention) = spawn_retention_task(audit, config.cleanup_after_days) {
            tracing::info!(
                cleanup_after_days = config.cleanup_after_days,
                "audit retention task started"
            );
        }
    }

    // Build application state
    let app_state = AppState {
        parking_service,
        event_bus,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
