//! Attendance report types and the statistics aggregator

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

use super::attendance::{AttendanceSession, SessionPage, SessionStatus};
use super::office::OfficeShort;

fn round_2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 100.0).round() / 100.0)
}

/// Aggregated statistics over a set of sessions.
///
/// Only completed sessions contribute hours and days; every completed
/// check-in/check-out pair counts as one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct AttendanceStatistics {
    /// All sessions in range, whatever their status
    pub total_sessions: i64,
    /// Completed sessions
    pub total_days: i64,
    /// Sessions still open
    pub incomplete_count: i64,
    pub total_minutes: i64,
    #[serde(serialize_with = "round_2")]
    pub total_hours: f64,
    #[serde(serialize_with = "round_2")]
    pub average_hours: f64,
}

impl AttendanceStatistics {
    pub fn from_sessions<'a, I>(sessions: I) -> Self
    where
        I: IntoIterator<Item = &'a AttendanceSession>,
    {
        let mut stats = Self::default();
        for session in sessions {
            stats.add(session);
        }
        stats
    }

    /// Fold one more session into the statistics
    pub fn add(&mut self, session: &AttendanceSession) {
        self.total_sessions += 1;
        match session.status {
            SessionStatus::Completed => {
                self.total_days += 1;
                self.total_minutes += i64::from(session.work_duration_minutes.unwrap_or(0));
            }
            SessionStatus::Active => self.incomplete_count += 1,
        }

        self.total_hours = self.total_minutes as f64 / 60.0;
        self.average_hours = if self.total_days > 0 {
            self.total_hours / self.total_days as f64
        } else {
            0.0
        };
    }
}

/// Query parameters for range reports
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct ReportQuery {
    /// Start date (YYYY-MM-DD), defaults to the first day of the current month
    pub start_date: Option<String>,
    /// End date (YYYY-MM-DD), defaults to the last day of the current month
    pub end_date: Option<String>,
    pub office_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Query parameters for the daily report
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct DailyQuery {
    /// Day (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
    pub office_id: Option<i64>,
}

/// Query parameters for month-based views
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct MonthQuery {
    /// Month (YYYY-MM), defaults to the current month
    pub month: Option<String>,
    pub office_id: Option<i64>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Resolved filters echoed back with a report
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReportFilters {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub office_id: Option<i64>,
    pub employee_id: Option<i64>,
}

/// Sessions in range plus their statistics
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceReport {
    pub statistics: AttendanceStatistics,
    pub sessions: SessionPage,
    pub filters: ReportFilters,
}

/// Administrator dashboard counters
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceOverview {
    pub date: NaiveDate,
    /// Sessions opened today
    pub today_sessions: i64,
    /// Sessions open right now, any day
    pub open_sessions: i64,
    pub active_offices: i64,
}

/// Sessions of one office on one day
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OfficeDailyGroup {
    pub office: OfficeShort,
    pub sessions: Vec<AttendanceSession>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub office_id: Option<i64>,
    pub total: i64,
    pub groups: Vec<OfficeDailyGroup>,
}

/// Monthly rollup for one employee
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeMonthlySummary {
    pub employee_id: i64,
    pub statistics: AttendanceStatistics,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlyReport {
    /// YYYY-MM
    pub month: String,
    /// e.g. "March 2024"
    pub month_name: String,
    pub office_id: Option<i64>,
    pub employees: Vec<EmployeeMonthlySummary>,
}

/// Parse a YYYY-MM-DD date
pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", value)))
}

/// Parse a YYYY-MM month into its first day
pub fn parse_month(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid month '{}', expected YYYY-MM", value)))
}

/// First and last day of the month containing `date`
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_month
        .and_then(|d| d.pred_opt())
        .unwrap_or(first);
    (first, last)
}
