//! REST endpoint handlers organized by resource.

pub mod areas;
pub mod events;
pub mod system;
pub mod users;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(areas::routes())
        .merge(events::routes())
        .merge(users::routes())
}
