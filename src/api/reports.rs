//! Attendance report endpoints (administrators and HR)

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::report::{
        AttendanceOverview, AttendanceReport, DailyQuery, DailyReport, MonthQuery, MonthlyReport,
        ReportQuery,
    },
    AppState,
};

use super::AuthenticatedUser;

/// Sessions in a date range with statistics
#[utoipa::path(
    get,
    path = "/reports",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(ReportQuery),
    responses(
        (status = 200, description = "Filtered sessions and statistics", body = AttendanceReport),
        (status = 400, description = "Invalid date range", body = crate::error::ErrorResponse),
        (status = 403, description = "Administrator or HR privileges required")
    )
)]
pub async fn get_report(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<AttendanceReport>> {
    claims.require_manager()?;

    let report = state.services.reports.report(query).await?;
    Ok(Json(report))
}

/// Today's counters
#[utoipa::path(
    get,
    path = "/reports/overview",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard counters", body = AttendanceOverview),
        (status = 403, description = "Administrator or HR privileges required")
    )
)]
pub async fn get_overview(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<AttendanceOverview>> {
    claims.require_manager()?;

    let overview = state.services.reports.overview().await?;
    Ok(Json(overview))
}

/// One day's sessions grouped by office
#[utoipa::path(
    get,
    path = "/reports/daily",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(DailyQuery),
    responses(
        (status = 200, description = "Sessions of the day", body = DailyReport),
        (status = 400, description = "Invalid date", body = crate::error::ErrorResponse),
        (status = 403, description = "Administrator or HR privileges required")
    )
)]
pub async fn get_daily_report(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<DailyQuery>,
) -> AppResult<Json<DailyReport>> {
    claims.require_manager()?;

    let report = state.services.reports.daily(query).await?;
    Ok(Json(report))
}

/// Per-employee rollups for a month
#[utoipa::path(
    get,
    path = "/reports/monthly",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(MonthQuery),
    responses(
        (status = 200, description = "Monthly rollups", body = MonthlyReport),
        (status = 400, description = "Invalid month", body = crate::error::ErrorResponse),
        (status = 403, description = "Administrator or HR privileges required")
    )
)]
pub async fn get_monthly_report(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<MonthQuery>,
) -> AppResult<Json<MonthlyReport>> {
    claims.require_manager()?;

    let report = state.services.reports.monthly(query).await?;
    Ok(Json(report))
}

/// One employee's sessions with statistics
#[utoipa::path(
    get,
    path = "/reports/employees/{id}",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Employee ID"),
        ReportQuery
    ),
    responses(
        (status = 200, description = "Employee sessions and statistics", body = AttendanceReport),
        (status = 403, description = "Administrator or HR privileges required")
    )
)]
pub async fn get_employee_report(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(employee_id): Path<i64>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<AttendanceReport>> {
    claims.require_manager()?;

    let report = state
        .services
        .reports
        .employee_report(employee_id, query)
        .await?;
    Ok(Json(report))
}
