//! Attendance sessions repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::attendance::{
        AttendanceSession, CheckOutFields, NewSession, Page, SessionOrder, SessionQuery,
        SessionStatus,
    },
};

use super::SessionStore;

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct AttendancesRepository {
    pool: Pool<Postgres>,
}

impl AttendancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Build the WHERE clause for a range query, numbering placeholders from 1
    fn where_clause(query: &SessionQuery) -> (String, usize) {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.employee_id.is_some() {
            conditions.push(format!("employee_id = ${}", idx));
            idx += 1;
        }
        if query.office_id.is_some() {
            conditions.push(format!("office_id = ${}", idx));
            idx += 1;
        }
        if query.start_date.is_some() {
            conditions.push(format!("work_date >= ${}", idx));
            idx += 1;
        }
        if query.end_date.is_some() {
            conditions.push(format!("work_date <= ${}", idx));
            idx += 1;
        }
        if query.status.is_some() {
            conditions.push(format!("status = ${}", idx));
            idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, idx)
    }
}

fn conflict_or_database(e: sqlx::Error, employee_id: i64) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return AppError::Conflict(format!(
                "Employee {} already has an open session today",
                employee_id
            ));
        }
    }
    AppError::Database(e)
}

#[async_trait]
impl SessionStore for AttendancesRepository {
    async fn find_open_session(
        &self,
        employee_id: i64,
        day: NaiveDate,
    ) -> AppResult<Option<AttendanceSession>> {
        let session = sqlx::query_as::<_, AttendanceSession>(
            r#"
            SELECT * FROM attendances
            WHERE employee_id = $1 AND work_date = $2 AND status = $3
            ORDER BY check_in DESC
            LIMIT 1
            "#,
        )
        .bind(employee_id)
        .bind(day)
        .bind(SessionStatus::Active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn create(&self, session: NewSession) -> AppResult<AttendanceSession> {
        // The partial unique index on (employee_id, work_date) for active rows
        // rejects a second open session
        sqlx::query_as::<_, AttendanceSession>(
            r#"
            INSERT INTO attendances (
                employee_id, office_id, work_date, check_in,
                check_in_latitude, check_in_longitude, check_in_distance,
                notes, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(session.employee_id)
        .bind(session.office_id)
        .bind(session.work_date)
        .bind(session.check_in)
        .bind(session.location.latitude)
        .bind(session.location.longitude)
        .bind(session.distance)
        .bind(&session.notes)
        .bind(SessionStatus::Active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_database(e, session.employee_id))
    }

    async fn complete_session(
        &self,
        session_id: i64,
        fields: CheckOutFields,
    ) -> AppResult<AttendanceSession> {
        let updated = sqlx::query_as::<_, AttendanceSession>(
            r#"
            UPDATE attendances
            SET check_out = $2,
                check_out_latitude = $3,
                check_out_longitude = $4,
                check_out_distance = $5,
                notes = $6,
                work_duration_minutes = $7,
                status = $8,
                updated_at = NOW()
            WHERE id = $1 AND status = $9
            RETURNING *
            "#,
        )
        .bind(session_id)
        .bind(fields.check_out)
        .bind(fields.location.latitude)
        .bind(fields.location.longitude)
        .bind(fields.distance)
        .bind(&fields.notes)
        .bind(fields.work_duration_minutes)
        .bind(SessionStatus::Completed)
        .bind(SessionStatus::Active)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(session) => Ok(session),
            None => {
                // Either the id is unknown (NotFound) or someone completed it first
                let existing = self.get_session(session_id).await?;
                Err(AppError::InvalidState(format!(
                    "Attendance session {} is already {}",
                    existing.id, existing.status
                )))
            }
        }
    }

    async fn get_session(&self, session_id: i64) -> AppResult<AttendanceSession> {
        sqlx::query_as::<_, AttendanceSession>("SELECT * FROM attendances WHERE id = $1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Attendance session with id {} not found", session_id))
            })
    }

    async fn recent_sessions(
        &self,
        employee_id: i64,
        limit: i64,
    ) -> AppResult<Vec<AttendanceSession>> {
        let sessions = sqlx::query_as::<_, AttendanceSession>(
            r#"
            SELECT * FROM attendances
            WHERE employee_id = $1
            ORDER BY check_in DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(employee_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    async fn sessions_in_range(
        &self,
        query: &SessionQuery,
        page: Page,
    ) -> AppResult<Vec<AttendanceSession>> {
        let (where_clause, idx) = Self::where_clause(query);
        let order = match query.order {
            SessionOrder::NewestFirst => "check_in DESC, id DESC",
            SessionOrder::OldestFirst => "check_in ASC, id ASC",
        };

        let sql = format!(
            "SELECT * FROM attendances {} ORDER BY {} LIMIT ${} OFFSET ${}",
            where_clause,
            order,
            idx,
            idx + 1
        );

        let mut builder = sqlx::query_as::<_, AttendanceSession>(&sql);
        if let Some(id) = query.employee_id {
            builder = builder.bind(id);
        }
        if let Some(id) = query.office_id {
            builder = builder.bind(id);
        }
        if let Some(d) = query.start_date {
            builder = builder.bind(d);
        }
        if let Some(d) = query.end_date {
            builder = builder.bind(d);
        }
        if let Some(s) = query.status {
            builder = builder.bind(s);
        }

        let rows = builder
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_in_range(&self, query: &SessionQuery) -> AppResult<i64> {
        let (where_clause, _) = Self::where_clause(query);
        let sql = format!("SELECT COUNT(*) FROM attendances {}", where_clause);

        let mut builder = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(id) = query.employee_id {
            builder = builder.bind(id);
        }
        if let Some(id) = query.office_id {
            builder = builder.bind(id);
        }
        if let Some(d) = query.start_date {
            builder = builder.bind(d);
        }
        if let Some(d) = query.end_date {
            builder = builder.bind(d);
        }
        if let Some(s) = query.status {
            builder = builder.bind(s);
        }

        Ok(builder.fetch_one(&self.pool).await?)
    }
}
