//! Attendance session model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

use crate::geo::Coordinates;

use super::office::{Office, OfficeShort};

/// Session lifecycle: Active until a successful check-out, then Completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(SessionStatus::Active),
            "completed" => Ok(SessionStatus::Completed),
            _ => Err(format!("Invalid session status: {}", s)),
        }
    }
}

// SQLx conversion for SessionStatus (stored as text)
impl sqlx::Type<Postgres> for SessionStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for SessionStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for SessionStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Attendance session row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceSession {
    pub id: i64,
    pub employee_id: i64,
    pub office_id: i64,
    /// Local calendar date of the check-in
    pub work_date: NaiveDate,
    pub check_in: DateTime<Utc>,
    pub check_in_latitude: f64,
    pub check_in_longitude: f64,
    /// Meters from the office center at check-in
    pub check_in_distance: i32,
    pub check_out: Option<DateTime<Utc>>,
    pub check_out_latitude: Option<f64>,
    pub check_out_longitude: Option<f64>,
    pub check_out_distance: Option<i32>,
    /// Whole minutes between check-in and check-out
    pub work_duration_minutes: Option<i32>,
    pub notes: Option<String>,
    pub status: SessionStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AttendanceSession {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn check_in_location(&self) -> Coordinates {
        Coordinates::new(self.check_in_latitude, self.check_in_longitude)
    }

    pub fn check_out_location(&self) -> Option<Coordinates> {
        match (self.check_out_latitude, self.check_out_longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        }
    }

    /// "8h 5m" style label, once completed
    pub fn work_duration_label(&self) -> Option<String> {
        self.work_duration_minutes.map(format_duration)
    }
}

/// Session together with the office it is bound to
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: AttendanceSession,
    pub office: Option<OfficeShort>,
}

/// What an employee sees on the attendance screen
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceStatus {
    /// Session opened today and not yet checked out
    pub active_session: Option<SessionView>,
    /// Offices available as check-in targets
    pub offices: Vec<Office>,
    pub recent_sessions: Vec<SessionView>,
}

/// Fields of a session opened by a successful check-in
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub employee_id: i64,
    pub office_id: i64,
    pub work_date: NaiveDate,
    pub check_in: DateTime<Utc>,
    pub location: Coordinates,
    pub distance: i32,
    pub notes: Option<String>,
}

/// Fields written by a successful check-out
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutFields {
    pub check_out: DateTime<Utc>,
    pub location: Coordinates,
    pub distance: i32,
    /// Complete notes value after appending the check-out notes
    pub notes: Option<String>,
    pub work_duration_minutes: i32,
}

/// Check-in command for a given employee
#[derive(Debug, Clone)]
pub struct CheckIn {
    pub employee_id: i64,
    pub office_id: i64,
    pub location: Coordinates,
    pub notes: Option<String>,
}

/// Check-out command for a given employee
#[derive(Debug, Clone)]
pub struct CheckOut {
    pub employee_id: i64,
    pub location: Coordinates,
    pub notes: Option<String>,
}

/// Ordering of session listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionOrder {
    /// Most recent check-in first
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Filter for session range queries. Dates are inclusive work dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionQuery {
    pub employee_id: Option<i64>,
    pub office_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<SessionStatus>,
    pub order: SessionOrder,
}

impl SessionQuery {
    /// Whether a session satisfies every filter of this query
    pub fn matches(&self, session: &AttendanceSession) -> bool {
        self.employee_id.map_or(true, |id| session.employee_id == id)
            && self.office_id.map_or(true, |id| session.office_id == id)
            && self.start_date.map_or(true, |d| session.work_date >= d)
            && self.end_date.map_or(true, |d| session.work_date <= d)
            && self.status.map_or(true, |s| session.status == s)
    }
}

/// Offset/limit window over a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Page {
    /// Window for a 1-based page number; far-out pages saturate to an empty window
    pub fn number(page: i64, per_page: i64) -> Self {
        let page = page.max(1);
        Self {
            offset: (page - 1).saturating_mul(per_page),
            limit: per_page,
        }
    }
}

/// One page of sessions
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionPage {
    pub items: Vec<AttendanceSession>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// Append check-out notes to the existing notes.
///
/// New notes are always joined with a newline, even onto empty notes, which
/// leaves a leading blank line. Absent or empty new notes keep the existing
/// value.
pub fn append_notes(existing: Option<&str>, new: Option<&str>) -> Option<String> {
    match new.filter(|n| !n.is_empty()) {
        Some(n) => Some(format!("{}\n{}", existing.unwrap_or_default(), n)),
        None => existing.map(str::to_owned),
    }
}

/// Whole minutes worked, never negative
pub fn work_duration_minutes(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> i32 {
    let minutes = (check_out - check_in).num_minutes().max(0);
    i32::try_from(minutes).unwrap_or(i32::MAX)
}

/// Format minutes as "{h}h {m}m"
pub fn format_duration(minutes: i32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}
