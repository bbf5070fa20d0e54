//! Parking area handlers: creation, reads, GeoJSON, and direct
//! park/leave operations.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{AreaDto, AreaSignalRequest, CreateAreaRequest, SignalResponse};
use crate::app_state::AppState;
use crate::domain::{AreaId, EventKind, ParkingSignal};
use crate::error::{ErrorResponse, GatewayError};
use crate::projection;

/// `POST /areas` — Create a new parking area.
///
/// # Errors
///
/// Returns [`GatewayError`] on a malformed boundary or duplicate name.
#[utoipa::path(
    post,
    path = "/api/v1/areas",
    tag = "Areas",
    summary = "Create a parking area",
    description = "Creates an area from a GeoJSON Polygon boundary with the given maximum capacity. All slots start free.",
    request_body = CreateAreaRequest,
    responses(
        (status = 201, description = "Area created successfully", body = AreaDto),
        (status = 400, description = "Invalid boundary", body = ErrorResponse),
        (status = 409, description = "Area name already taken", body = ErrorResponse),
    )
)]
pub async fn create_area(
    State(state): State<AppState>,
    Json(req): Json<CreateAreaRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let boundary = geo::Polygon::<f64>::try_from(req.boundary.value)
        .map_err(|e| GatewayError::InvalidInput(format!("boundary is not a polygon: {e}")))?;

    let snapshot = state
        .parking_service
        .create_area(&req.name, boundary, req.max_capacity)
        .await?;

    Ok((StatusCode::CREATED, Json(AreaDto::from(&snapshot))))
}

/// `GET /areas` — List all parking areas.
#[utoipa::path(
    get,
    path = "/api/v1/areas",
    tag = "Areas",
    summary = "List parking areas",
    responses(
        (status = 200, description = "All areas with current capacity", body = Vec<AreaDto>),
    )
)]
pub async fn list_areas(State(state): State<AppState>) -> impl IntoResponse {
    let areas = state.parking_service.areas().snapshot_all().await;
    let dtos: Vec<AreaDto> = areas.iter().map(AreaDto::from).collect();
    Json(dtos)
}

/// `GET /areas/{id}` — Get a single area.
///
/// # Errors
///
/// Returns [`GatewayError::AreaNotFound`] if the area does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/areas/{id}",
    tag = "Areas",
    summary = "Get area by id",
    params(("id" = i64, Path, description = "Area id")),
    responses(
        (status = 200, description = "Area details", body = AreaDto),
        (status = 404, description = "Area not found", body = ErrorResponse),
    )
)]
pub async fn get_area(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, GatewayError> {
    let snapshot = state.parking_service.areas().snapshot(AreaId::new(id)).await?;
    Ok(Json(AreaDto::from(&snapshot)))
}

/// `GET /areas/name/{name}` — Get a single area by its label.
///
/// # Errors
///
/// Returns [`GatewayError::AreaNameNotFound`] if no area has the name.
#[utoipa::path(
    get,
    path = "/api/v1/areas/name/{name}",
    tag = "Areas",
    summary = "Get area by name",
    params(("name" = String, Path, description = "Area name")),
    responses(
        (status = 200, description = "Area details", body = AreaDto),
        (status = 404, description = "Area not found", body = ErrorResponse),
    )
)]
pub async fn get_area_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let snapshot = state.parking_service.areas().snapshot_by_name(&name).await?;
    Ok(Json(AreaDto::from(&snapshot)))
}

/// `GET /areas/geojson` — All areas as a GeoJSON FeatureCollection.
#[utoipa::path(
    get,
    path = "/api/v1/areas/geojson",
    tag = "Areas",
    summary = "All areas as GeoJSON",
    responses(
        (status = 200, description = "FeatureCollection of area polygons", body = serde_json::Value),
    )
)]
pub async fn areas_geojson(State(state): State<AppState>) -> impl IntoResponse {
    let areas = state.parking_service.areas().snapshot_all().await;
    Json(projection::area_collection(&areas))
}

/// `GET /areas/{id}/geojson` — One area as a GeoJSON Feature.
///
/// # Errors
///
/// Returns [`GatewayError::AreaNotFound`] if the area does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/areas/{id}/geojson",
    tag = "Areas",
    summary = "Area as GeoJSON",
    params(("id" = i64, Path, description = "Area id")),
    responses(
        (status = 200, description = "Feature with the area polygon", body = serde_json::Value),
        (status = 404, description = "Area not found", body = ErrorResponse),
    )
)]
pub async fn area_geojson(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, GatewayError> {
    let snapshot = state.parking_service.areas().snapshot(AreaId::new(id)).await?;
    Ok(Json(projection::area_feature(&snapshot)))
}

/// `GET /areas/available` — Areas with at least one free slot.
#[utoipa::path(
    get,
    path = "/api/v1/areas/available",
    tag = "Areas",
    summary = "Areas with free slots",
    responses(
        (status = 200, description = "Areas where residual capacity > 0", body = Vec<AreaDto>),
    )
)]
pub async fn available_areas(State(state): State<AppState>) -> impl IntoResponse {
    let areas = state.parking_service.areas().snapshot_all().await;
    let dtos: Vec<AreaDto> = areas
        .iter()
        .filter(|a| a.residual_capacity > 0)
        .map(AreaDto::from)
        .collect();
    Json(dtos)
}

/// `GET /areas/full` — Areas with no free slot.
#[utoipa::path(
    get,
    path = "/api/v1/areas/full",
    tag = "Areas",
    summary = "Full areas",
    responses(
        (status = 200, description = "Areas where residual capacity = 0", body = Vec<AreaDto>),
    )
)]
pub async fn full_areas(State(state): State<AppState>) -> impl IntoResponse {
    let areas = state.parking_service.areas().snapshot_all().await;
    let dtos: Vec<AreaDto> = areas
        .iter()
        .filter(|a| a.residual_capacity == 0)
        .map(AreaDto::from)
        .collect();
    Json(dtos)
}

/// `GET /areas/summary` — Aggregate capacity summary across all areas.
#[utoipa::path(
    get,
    path = "/api/v1/areas/summary",
    tag = "Areas",
    summary = "Capacity summary",
    description = "Totals across every area, computed from one consistent snapshot.",
    responses(
        (status = 200, description = "Aggregate capacity numbers", body = crate::projection::CapacitySummary),
    )
)]
pub async fn capacity_summary(State(state): State<AppState>) -> impl IntoResponse {
    let areas = state.parking_service.areas().snapshot_all().await;
    Json(projection::capacity_summary(&areas))
}

/// `POST /areas/{id}/park` — Park a bicycle in an explicitly addressed
/// area, bypassing spatial resolution.
///
/// # Errors
///
/// Returns [`GatewayError`] on capacity rejection, unknown area, or
/// unknown user.
#[utoipa::path(
    post,
    path = "/api/v1/areas/{id}/park",
    tag = "Areas",
    summary = "Park in a specific area",
    params(("id" = i64, Path, description = "Area id")),
    request_body = AreaSignalRequest,
    responses(
        (status = 200, description = "Bicycle parked", body = SignalResponse),
        (status = 404, description = "Area not found", body = ErrorResponse),
        (status = 422, description = "Area is full", body = ErrorResponse),
    )
)]
pub async fn park_in_area(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AreaSignalRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    submit_at_area(&state, AreaId::new(id), req, EventKind::Park).await
}

/// `POST /areas/{id}/leave` — Remove a bicycle from an explicitly
/// addressed area.
///
/// # Errors
///
/// Returns [`GatewayError`] on capacity rejection, unknown area, or
/// unknown user.
#[utoipa::path(
    post,
    path = "/api/v1/areas/{id}/leave",
    tag = "Areas",
    summary = "Leave a specific area",
    params(("id" = i64, Path, description = "Area id")),
    request_body = AreaSignalRequest,
    responses(
        (status = 200, description = "Bicycle removed", body = SignalResponse),
        (status = 404, description = "Area not found", body = ErrorResponse),
        (status = 422, description = "Area is already empty", body = ErrorResponse),
    )
)]
pub async fn leave_area(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AreaSignalRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    submit_at_area(&state, AreaId::new(id), req, EventKind::Leave).await
}

async fn submit_at_area(
    state: &AppState,
    area_id: AreaId,
    req: AreaSignalRequest,
    kind: EventKind,
) -> Result<Json<SignalResponse>, GatewayError> {
    let signal = ParkingSignal {
        user_id: req.user_id,
        longitude: req.longitude,
        latitude: req.latitude,
        kind,
        start_time: req.start_time,
        end_time: req.end_time,
    };
    let outcome = state.parking_service.submit_signal_at(area_id, signal).await?;
    Ok(Json(SignalResponse {
        event: (&outcome.event).into(),
        area: (&outcome.area).into(),
    }))
}

/// Area routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/areas", post(create_area).get(list_areas))
        .route("/areas/geojson", get(areas_geojson))
        .route("/areas/available", get(available_areas))
        .route("/areas/full", get(full_areas))
        .route("/areas/summary", get(capacity_summary))
        .route("/areas/name/{name}", get(get_area_by_name))
        .route("/areas/{id}", get(get_area))
        .route("/areas/{id}/geojson", get(area_geojson))
        .route("/areas/{id}/park", post(park_in_area))
        .route("/areas/{id}/leave", post(leave_area))
}
