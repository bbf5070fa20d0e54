//! Parking event handlers: signal submission and event log reads.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{EventDto, ParkingSignalRequest, RecentParams, SignalResponse};
use crate::app_state::AppState;
use crate::domain::{AreaId, EventId, EventKind, UserId};
use crate::error::{ErrorResponse, GatewayError};
use crate::projection;

/// `POST /events/parking` — Submit a park/leave signal.
///
/// Runs the full transaction: resolve the owning area from the reported
/// coordinate, apply the capacity delta, record the event.
///
/// # Errors
///
/// Returns [`GatewayError`] on validation failure, unresolved location,
/// capacity rejection, or unknown user.
#[utoipa::path(
    post,
    path = "/api/v1/events/parking",
    tag = "Events",
    summary = "Submit a parking signal",
    description = "Resolves the containing area from the GPS fix, applies the capacity change, and appends an immutable event. The whole operation is atomic: on any failure no partial state is written.",
    request_body = ParkingSignalRequest,
    responses(
        (status = 201, description = "Transaction completed", body = SignalResponse),
        (status = 400, description = "Invalid input or unknown user", body = ErrorResponse),
        (status = 422, description = "Location outside any area, or capacity rejection", body = ErrorResponse),
    )
)]
pub async fn submit_signal(
    State(state): State<AppState>,
    Json(req): Json<ParkingSignalRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let outcome = state
        .parking_service
        .submit_signal(req.into_signal())
        .await?;

    let response = SignalResponse {
        event: (&outcome.event).into(),
        area: (&outcome.area).into(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /events` — Every recorded event in append order.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List all events",
    responses(
        (status = 200, description = "All recorded events", body = Vec<EventDto>),
    )
)]
pub async fn list_events(State(state): State<AppState>) -> impl IntoResponse {
    let events = state.parking_service.log().all().await;
    let dtos: Vec<EventDto> = events.iter().map(EventDto::from).collect();
    Json(dtos)
}

/// `GET /events/{id}` — Get a single event.
///
/// # Errors
///
/// Returns [`GatewayError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Get event by id",
    params(("id" = i64, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event details", body = EventDto),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, GatewayError> {
    let event = state.parking_service.log().get(EventId::new(id)).await?;
    Ok(Json(EventDto::from(&event)))
}

/// `GET /events/user/{user_id}` — Events originated by one user.
#[utoipa::path(
    get,
    path = "/api/v1/events/user/{user_id}",
    tag = "Events",
    summary = "Events by user",
    params(("user_id" = uuid::Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Events for the user", body = Vec<EventDto>),
    )
)]
pub async fn events_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let events = state
        .parking_service
        .log()
        .by_user(UserId::from_uuid(user_id))
        .await;
    let dtos: Vec<EventDto> = events.iter().map(EventDto::from).collect();
    Json(dtos)
}

/// `GET /events/area/{area_id}` — Events recorded against one area.
#[utoipa::path(
    get,
    path = "/api/v1/events/area/{area_id}",
    tag = "Events",
    summary = "Events by area",
    params(("area_id" = i64, Path, description = "Area id")),
    responses(
        (status = 200, description = "Events for the area", body = Vec<EventDto>),
    )
)]
pub async fn events_by_area(
    State(state): State<AppState>,
    Path(area_id): Path<i64>,
) -> impl IntoResponse {
    let events = state
        .parking_service
        .log()
        .by_area(AreaId::new(area_id))
        .await;
    let dtos: Vec<EventDto> = events.iter().map(EventDto::from).collect();
    Json(dtos)
}

/// `GET /events/kind/{kind}` — Events of one kind (`park` / `leave`).
///
/// # Errors
///
/// Returns [`GatewayError::InvalidInput`] for an unknown kind string.
#[utoipa::path(
    get,
    path = "/api/v1/events/kind/{kind}",
    tag = "Events",
    summary = "Events by kind",
    params(("kind" = String, Path, description = "Event kind: park or leave")),
    responses(
        (status = 200, description = "Events of the kind", body = Vec<EventDto>),
        (status = 400, description = "Unknown kind", body = ErrorResponse),
    )
)]
pub async fn events_by_kind(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let kind: EventKind = kind.parse().map_err(GatewayError::InvalidInput)?;
    let events = state.parking_service.log().by_kind(kind).await;
    let dtos: Vec<EventDto> = events.iter().map(EventDto::from).collect();
    Ok(Json(dtos))
}

/// `GET /events/recent` — The N most recent events by start time.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidInput`] when `limit` is zero.
#[utoipa::path(
    get,
    path = "/api/v1/events/recent",
    tag = "Events",
    summary = "Most recent events",
    params(RecentParams),
    responses(
        (status = 200, description = "Events ordered by start time descending", body = Vec<EventDto>),
        (status = 400, description = "Invalid limit", body = ErrorResponse),
    )
)]
pub async fn recent_events(
    State(state): State<AppState>,
    Query(params): Query<RecentParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let events = state.parking_service.log().recent(params.limit).await?;
    let dtos: Vec<EventDto> = events.iter().map(EventDto::from).collect();
    Ok(Json(dtos))
}

/// `GET /events/geojson` — All events as a GeoJSON FeatureCollection.
#[utoipa::path(
    get,
    path = "/api/v1/events/geojson",
    tag = "Events",
    summary = "All events as GeoJSON",
    responses(
        (status = 200, description = "FeatureCollection of event points", body = serde_json::Value),
    )
)]
pub async fn events_geojson(State(state): State<AppState>) -> impl IntoResponse {
    let events = state.parking_service.log().all().await;
    Json(projection::event_collection(&events))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/parking", post(submit_signal))
        .route("/events/geojson", get(events_geojson))
        .route("/events/recent", get(recent_events))
        .route("/events/user/{user_id}", get(events_by_user))
        .route("/events/area/{area_id}", get(events_by_area))
        .route("/events/kind/{kind}", get(events_by_kind))
        .route("/events/{id}", get(get_event))
}
