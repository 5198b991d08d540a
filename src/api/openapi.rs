//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{attendance, health, offices, reports};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance API",
        version = "1.0.0",
        description = "Geofenced employee check-in / check-out REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Offices
        offices::list_offices,
        offices::get_office,
        // Attendance
        attendance::get_status,
        attendance::check_in,
        attendance::check_out,
        attendance::get_history,
        // Reports
        reports::get_report,
        reports::get_overview,
        reports::get_daily_report,
        reports::get_monthly_report,
        reports::get_employee_report,
    ),
    components(
        schemas(
            // Offices
            crate::models::office::Office,
            crate::models::office::OfficeShort,
            crate::geo::Coordinates,
            // Attendance
            crate::models::attendance::SessionStatus,
            crate::models::attendance::AttendanceSession,
            crate::models::attendance::SessionView,
            crate::models::attendance::SessionPage,
            crate::models::attendance::AttendanceStatus,
            attendance::CheckInRequest,
            attendance::CheckOutRequest,
            attendance::AttendanceResponse,
            // Reports
            crate::models::report::AttendanceStatistics,
            crate::models::report::ReportFilters,
            crate::models::report::AttendanceReport,
            crate::models::report::AttendanceOverview,
            crate::models::report::OfficeDailyGroup,
            crate::models::report::DailyReport,
            crate::models::report::EmployeeMonthlySummary,
            crate::models::report::MonthlyReport,
            // Users
            crate::models::user::Role,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "offices", description = "Registered offices"),
        (name = "attendance", description = "Employee check-in and check-out"),
        (name = "reports", description = "Attendance reports")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
