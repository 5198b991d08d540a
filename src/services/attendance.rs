//! Attendance engine: check-in / check-out state machine with geofence admission
//!
//! A session moves NoSession → Active → Completed. Check-in requires that no
//! session is open today, check-out requires that one is. Both directions are
//! gated on the distance to the office center being within its radius, and a
//! rejected admission leaves the stored session untouched.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    config::AttendanceConfig,
    error::{AppError, AppResult},
    geo::{self, GeofenceAction},
    models::{
        attendance::{
            append_notes, work_duration_minutes, AttendanceSession, AttendanceStatus, CheckIn,
            CheckOut, CheckOutFields, NewSession, SessionView,
        },
        office::{Office, OfficeShort},
    },
    repository::{OfficeRegistry, SessionStore},
};

use super::{local_date, Clock};

#[derive(Clone)]
pub struct AttendanceService {
    offices: Arc<dyn OfficeRegistry>,
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    config: AttendanceConfig,
}

impl AttendanceService {
    pub fn new(
        offices: Arc<dyn OfficeRegistry>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        config: AttendanceConfig,
    ) -> Self {
        Self {
            offices,
            sessions,
            clock,
            config,
        }
    }

    /// Open a session for the employee at the given office
    pub async fn check_in(&self, request: CheckIn) -> AppResult<(AttendanceSession, Office)> {
        // "Today" is fixed once for the whole request
        let now = self.clock.now();
        let today = local_date(now);

        if self
            .sessions
            .find_open_session(request.employee_id, today)
            .await?
            .is_some()
        {
            tracing::debug!(employee_id = request.employee_id, "Check-in rejected: already checked in");
            return Err(AppError::AlreadyCheckedIn);
        }

        let office = self
            .offices
            .get_office(request.office_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(msg) => AppError::InvalidOffice(msg),
                other => other,
            })?;

        if !office.is_active {
            return Err(AppError::InvalidOffice(format!(
                "Office {} is not accepting check-ins",
                office.id
            )));
        }

        let distance = office.distance_from(&request.location);
        if let Err(e) = geo::admit(distance, office.radius_meters, GeofenceAction::CheckIn) {
            tracing::debug!(
                employee_id = request.employee_id,
                office_id = office.id,
                distance,
                radius = office.radius_meters,
                "Check-in rejected: out of range"
            );
            return Err(e);
        }

        let new_session = NewSession {
            employee_id: request.employee_id,
            office_id: office.id,
            work_date: today,
            check_in: now,
            location: request.location,
            distance: geo::round_meters(distance),
            notes: request.notes.filter(|n| !n.is_empty()),
        };

        // Losing a race against a concurrent check-in reads the same as the pre-check
        let session = self
            .sessions
            .create(new_session)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => AppError::AlreadyCheckedIn,
                other => other,
            })?;

        tracing::info!(
            employee_id = session.employee_id,
            office_id = session.office_id,
            session_id = session.id,
            distance = session.check_in_distance,
            "Checked in"
        );

        Ok((session, office))
    }

    /// Complete the employee's open session for today
    pub async fn check_out(&self, request: CheckOut) -> AppResult<(AttendanceSession, Office)> {
        let now = self.clock.now();
        let today = local_date(now);

        let session = self
            .sessions
            .find_open_session(request.employee_id, today)
            .await?
            .ok_or(AppError::NoActiveSession)?;

        let office = self
            .offices
            .get_office(session.office_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(msg) => {
                    tracing::error!(
                        session_id = session.id,
                        office_id = session.office_id,
                        "Open attendance session references a missing office"
                    );
                    AppError::InvalidOffice(msg)
                }
                other => other,
            })?;

        // The office's current radius applies, not the one in force at check-in
        let distance = office.distance_from(&request.location);
        if let Err(e) = geo::admit(distance, office.radius_meters, GeofenceAction::CheckOut) {
            tracing::debug!(
                employee_id = request.employee_id,
                session_id = session.id,
                distance,
                radius = office.radius_meters,
                "Check-out rejected: out of range"
            );
            return Err(e);
        }

        let fields = CheckOutFields {
            check_out: now,
            location: request.location,
            distance: geo::round_meters(distance),
            notes: append_notes(session.notes.as_deref(), request.notes.as_deref()),
            work_duration_minutes: work_duration_minutes(session.check_in, now),
        };

        let completed = self
            .sessions
            .complete_session(session.id, fields)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) | AppError::InvalidState(_) => AppError::NoActiveSession,
                other => other,
            })?;

        tracing::info!(
            employee_id = completed.employee_id,
            session_id = completed.id,
            work_duration_minutes = completed.work_duration_minutes,
            "Checked out"
        );

        Ok((completed, office))
    }

    /// Today's open session, if any
    pub async fn open_session(&self, employee_id: i64) -> AppResult<Option<AttendanceSession>> {
        let today = local_date(self.clock.now());
        self.sessions.find_open_session(employee_id, today).await
    }

    /// Open session, check-in targets and latest sessions for one employee
    pub async fn status(&self, employee_id: i64) -> AppResult<AttendanceStatus> {
        let offices = self.offices.list_active().await?;
        let open = self.open_session(employee_id).await?;
        let recent = self
            .sessions
            .recent_sessions(employee_id, self.config.recent_limit)
            .await?;

        let mut names: HashMap<i64, Option<OfficeShort>> = offices
            .iter()
            .map(|o| (o.id, Some(OfficeShort::from(o))))
            .collect();

        let active_session = match open {
            Some(session) => Some(self.view(session, &mut names).await?),
            None => None,
        };

        let mut recent_sessions = Vec::with_capacity(recent.len());
        for session in recent {
            recent_sessions.push(self.view(session, &mut names).await?);
        }

        Ok(AttendanceStatus {
            active_session,
            offices,
            recent_sessions,
        })
    }

    /// Attach office details through an explicit registry lookup
    async fn view(
        &self,
        session: AttendanceSession,
        cache: &mut HashMap<i64, Option<OfficeShort>>,
    ) -> AppResult<SessionView> {
        let office = match cache.get(&session.office_id) {
            Some(office) => office.clone(),
            None => {
                let office = match self.offices.get_office(session.office_id).await {
                    Ok(office) => Some(OfficeShort::from(&office)),
                    Err(AppError::NotFound(_)) => None,
                    Err(e) => return Err(e),
                };
                cache.insert(session.office_id, office.clone());
                office
            }
        };

        Ok(SessionView { session, office })
    }
}
