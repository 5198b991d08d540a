//! Office endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{error::AppResult, models::office::Office, AppState};

use super::AuthenticatedUser;

/// List offices accepting check-ins
#[utoipa::path(
    get,
    path = "/offices",
    tag = "offices",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active offices ordered by name", body = Vec<Office>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_offices(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Office>>> {
    let offices = state.services.offices.list_active().await?;
    Ok(Json(offices))
}

/// Get office details
#[utoipa::path(
    get,
    path = "/offices/{id}",
    tag = "offices",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Office ID")
    ),
    responses(
        (status = 200, description = "Office details", body = Office),
        (status = 404, description = "Office not found")
    )
)]
pub async fn get_office(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Office>> {
    let office = state.services.offices.get(id).await?;
    Ok(Json(office))
}
