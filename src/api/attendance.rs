//! Employee attendance endpoints: status, check-in, check-out, history

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    geo::Coordinates,
    models::{
        attendance::{format_duration, AttendanceSession, AttendanceStatus, CheckIn, CheckOut},
        office::OfficeShort,
        report::{AttendanceReport, MonthQuery},
    },
    AppState,
};

use super::AuthenticatedUser;

/// Check-in request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckInRequest {
    /// Office to check in at
    pub office_id: i64,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Check-out request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckOutRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Result of a successful check-in or check-out
#[derive(Serialize, ToSchema)]
pub struct AttendanceResponse {
    pub session: AttendanceSession,
    pub office: OfficeShort,
    /// Status message
    pub message: String,
}

/// Today's attendance state for the caller
#[utoipa::path(
    get,
    path = "/attendance",
    tag = "attendance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Open session, check-in targets and recent sessions", body = AttendanceStatus),
        (status = 403, description = "Caller is not an employee")
    )
)]
pub async fn get_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<AttendanceStatus>> {
    let employee_id = claims.require_employee()?;

    let status = state.services.attendance.status(employee_id).await?;
    Ok(Json(status))
}

/// Check in at an office
#[utoipa::path(
    post,
    path = "/attendance",
    tag = "attendance",
    security(("bearer_auth" = [])),
    request_body = CheckInRequest,
    responses(
        (status = 201, description = "Checked in", body = AttendanceResponse),
        (status = 400, description = "Invalid coordinates or notes", body = crate::error::ErrorResponse),
        (status = 409, description = "Already checked in today", body = crate::error::ErrorResponse),
        (status = 422, description = "Out of range or invalid office", body = crate::error::ErrorResponse)
    )
)]
pub async fn check_in(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CheckInRequest>,
) -> AppResult<(StatusCode, Json<AttendanceResponse>)> {
    let employee_id = claims.require_employee()?;
    request.validate()?;

    let (session, office) = state
        .services
        .attendance
        .check_in(CheckIn {
            employee_id,
            office_id: request.office_id,
            location: Coordinates::new(request.latitude, request.longitude),
            notes: request.notes,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AttendanceResponse {
            message: format!("Successfully checked in at {}!", office.name),
            office: OfficeShort::from(&office),
            session,
        }),
    ))
}

/// Check out of today's open session
#[utoipa::path(
    put,
    path = "/attendance",
    tag = "attendance",
    security(("bearer_auth" = [])),
    request_body = CheckOutRequest,
    responses(
        (status = 200, description = "Checked out", body = AttendanceResponse),
        (status = 400, description = "Invalid coordinates or notes", body = crate::error::ErrorResponse),
        (status = 409, description = "No active session today", body = crate::error::ErrorResponse),
        (status = 422, description = "Out of range", body = crate::error::ErrorResponse)
    )
)]
pub async fn check_out(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CheckOutRequest>,
) -> AppResult<Json<AttendanceResponse>> {
    let employee_id = claims.require_employee()?;
    request.validate()?;

    let (session, office) = state
        .services
        .attendance
        .check_out(CheckOut {
            employee_id,
            location: Coordinates::new(request.latitude, request.longitude),
            notes: request.notes,
        })
        .await?;

    let duration = format_duration(session.work_duration_minutes.unwrap_or(0));
    Ok(Json(AttendanceResponse {
        message: format!("Successfully checked out! Work duration: {}", duration),
        office: OfficeShort::from(&office),
        session,
    }))
}

/// The caller's sessions over one month
#[utoipa::path(
    get,
    path = "/attendance/history",
    tag = "attendance",
    security(("bearer_auth" = [])),
    params(MonthQuery),
    responses(
        (status = 200, description = "Sessions and statistics for the month", body = AttendanceReport),
        (status = 400, description = "Invalid month", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_history(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<MonthQuery>,
) -> AppResult<Json<AttendanceReport>> {
    let employee_id = claims.require_employee()?;

    let report = state.services.reports.history(employee_id, query).await?;
    Ok(Json(report))
}
