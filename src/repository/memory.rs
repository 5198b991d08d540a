//! In-process office registry and session store
//!
//! Both keep their state behind a mutex so every check-and-write runs under
//! a single lock, giving the same guarantees as the database constraints.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, RwLock};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        attendance::{
            AttendanceSession, CheckOutFields, NewSession, Page, SessionOrder, SessionQuery,
            SessionStatus,
        },
        office::Office,
    },
};

use super::{OfficeRegistry, SessionStore};

fn poisoned<T>(_: T) -> AppError {
    AppError::Internal("in-memory store lock poisoned".to_string())
}

#[derive(Default)]
pub struct MemoryOfficeRegistry {
    offices: RwLock<BTreeMap<i64, Office>>,
}

impl MemoryOfficeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offices(offices: impl IntoIterator<Item = Office>) -> Self {
        Self {
            offices: RwLock::new(offices.into_iter().map(|o| (o.id, o)).collect()),
        }
    }

    /// Insert or replace an office
    pub fn upsert(&self, office: Office) -> AppResult<()> {
        self.offices
            .write()
            .map_err(poisoned)?
            .insert(office.id, office);
        Ok(())
    }

    pub fn remove(&self, id: i64) -> AppResult<Option<Office>> {
        Ok(self.offices.write().map_err(poisoned)?.remove(&id))
    }
}

#[async_trait]
impl OfficeRegistry for MemoryOfficeRegistry {
    async fn get_office(&self, id: i64) -> AppResult<Office> {
        self.offices
            .read()
            .map_err(poisoned)?
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Office with id {} not found", id)))
    }

    async fn list_active(&self) -> AppResult<Vec<Office>> {
        let mut offices: Vec<Office> = self
            .offices
            .read()
            .map_err(poisoned)?
            .values()
            .filter(|o| o.is_active)
            .cloned()
            .collect();
        offices.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(offices)
    }
}

#[derive(Default)]
struct SessionTable {
    next_id: i64,
    rows: BTreeMap<i64, AttendanceSession>,
}

#[derive(Default)]
pub struct MemorySessionStore {
    table: Mutex<SessionTable>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, SessionTable>> {
        self.table.lock().map_err(poisoned)
    }

    /// Insert a row as-is, e.g. a session left open on a previous day
    pub fn insert_raw(&self, session: AttendanceSession) -> AppResult<()> {
        let mut table = self.lock()?;
        table.next_id = table.next_id.max(session.id);
        table.rows.insert(session.id, session);
        Ok(())
    }

    fn matching(&self, query: &SessionQuery) -> AppResult<Vec<AttendanceSession>> {
        let table = self.lock()?;
        let mut sessions: Vec<AttendanceSession> = table
            .rows
            .values()
            .filter(|s| query.matches(s))
            .cloned()
            .collect();

        sessions.sort_by(|a, b| (a.check_in, a.id).cmp(&(b.check_in, b.id)));
        if query.order == SessionOrder::NewestFirst {
            sessions.reverse();
        }
        Ok(sessions)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn find_open_session(
        &self,
        employee_id: i64,
        day: NaiveDate,
    ) -> AppResult<Option<AttendanceSession>> {
        let table = self.lock()?;
        Ok(table
            .rows
            .values()
            .filter(|s| s.employee_id == employee_id && s.work_date == day && s.is_active())
            .max_by_key(|s| s.check_in)
            .cloned())
    }

    async fn create(&self, session: NewSession) -> AppResult<AttendanceSession> {
        let mut table = self.lock()?;

        let already_open = table.rows.values().any(|s| {
            s.employee_id == session.employee_id && s.work_date == session.work_date && s.is_active()
        });
        if already_open {
            return Err(AppError::Conflict(format!(
                "Employee {} already has an open session today",
                session.employee_id
            )));
        }

        table.next_id += 1;
        let now = Utc::now();
        let row = AttendanceSession {
            id: table.next_id,
            employee_id: session.employee_id,
            office_id: session.office_id,
            work_date: session.work_date,
            check_in: session.check_in,
            check_in_latitude: session.location.latitude,
            check_in_longitude: session.location.longitude,
            check_in_distance: session.distance,
            check_out: None,
            check_out_latitude: None,
            check_out_longitude: None,
            check_out_distance: None,
            work_duration_minutes: None,
            notes: session.notes,
            status: SessionStatus::Active,
            created_at: Some(now),
            updated_at: Some(now),
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn complete_session(
        &self,
        session_id: i64,
        fields: CheckOutFields,
    ) -> AppResult<AttendanceSession> {
        let mut table = self.lock()?;
        let row = table.rows.get_mut(&session_id).ok_or_else(|| {
            AppError::NotFound(format!("Attendance session with id {} not found", session_id))
        })?;

        if !row.is_active() {
            return Err(AppError::InvalidState(format!(
                "Attendance session {} is already {}",
                row.id, row.status
            )));
        }

        row.check_out = Some(fields.check_out);
        row.check_out_latitude = Some(fields.location.latitude);
        row.check_out_longitude = Some(fields.location.longitude);
        row.check_out_distance = Some(fields.distance);
        row.notes = fields.notes;
        row.work_duration_minutes = Some(fields.work_duration_minutes);
        row.status = SessionStatus::Completed;
        row.updated_at = Some(Utc::now());

        Ok(row.clone())
    }

    async fn get_session(&self, session_id: i64) -> AppResult<AttendanceSession> {
        self.lock()?.rows.get(&session_id).cloned().ok_or_else(|| {
            AppError::NotFound(format!("Attendance session with id {} not found", session_id))
        })
    }

    async fn recent_sessions(
        &self,
        employee_id: i64,
        limit: i64,
    ) -> AppResult<Vec<AttendanceSession>> {
        let query = SessionQuery {
            employee_id: Some(employee_id),
            ..Default::default()
        };
        let mut sessions = self.matching(&query)?;
        sessions.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(sessions)
    }

    async fn sessions_in_range(
        &self,
        query: &SessionQuery,
        page: Page,
    ) -> AppResult<Vec<AttendanceSession>> {
        let offset = usize::try_from(page.offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit.max(0)).unwrap_or(usize::MAX);
        Ok(self
            .matching(query)?
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn count_in_range(&self, query: &SessionQuery) -> AppResult<i64> {
        let table = self.lock()?;
        Ok(table.rows.values().filter(|s| query.matches(s)).count() as i64)
    }
}
