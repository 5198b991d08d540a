//! Repository layer: storage contracts and their implementations

pub mod attendances;
pub mod memory;
pub mod offices;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        attendance::{AttendanceSession, CheckOutFields, NewSession, Page, SessionQuery},
        office::Office,
    },
};

/// Read-only lookup of registered offices
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfficeRegistry: Send + Sync {
    /// Fails with `NotFound` for an unknown id
    async fn get_office(&self, id: i64) -> AppResult<Office>;

    /// Active offices ordered by name
    async fn list_active(&self) -> AppResult<Vec<Office>>;
}

/// Owner of attendance session records.
///
/// Implementations guarantee at most one active session per employee per
/// work date, and that completion is an atomic active → completed swap.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The employee's active session opened on `day`, if any
    async fn find_open_session(
        &self,
        employee_id: i64,
        day: NaiveDate,
    ) -> AppResult<Option<AttendanceSession>>;

    /// Open a session; `Conflict` if one is already open for that employee and day
    async fn create(&self, session: NewSession) -> AppResult<AttendanceSession>;

    /// Complete an active session; `NotFound` for an unknown id,
    /// `InvalidState` if it is already completed
    async fn complete_session(
        &self,
        session_id: i64,
        fields: CheckOutFields,
    ) -> AppResult<AttendanceSession>;

    async fn get_session(&self, session_id: i64) -> AppResult<AttendanceSession>;

    /// Latest sessions of an employee, newest first
    async fn recent_sessions(&self, employee_id: i64, limit: i64)
        -> AppResult<Vec<AttendanceSession>>;

    /// One window of the sessions matching `query`. Every call re-runs the query.
    async fn sessions_in_range(
        &self,
        query: &SessionQuery,
        page: Page,
    ) -> AppResult<Vec<AttendanceSession>>;

    async fn count_in_range(&self, query: &SessionQuery) -> AppResult<i64>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub offices: offices::OfficesRepository,
    pub attendances: attendances::AttendancesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            offices: offices::OfficesRepository::new(pool.clone()),
            attendances: attendances::AttendancesRepository::new(pool.clone()),
            pool,
        }
    }
}
