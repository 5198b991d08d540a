//! Business logic services

pub mod attendance;
pub mod offices;
pub mod reports;

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::{
    config::AttendanceConfig,
    repository::{OfficeRegistry, Repository, SessionStore},
};

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Calendar date of an instant in the server's local time
pub fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub attendance: attendance::AttendanceService,
    pub offices: offices::OfficesService,
    pub reports: reports::ReportsService,
}

impl Services {
    /// Create all services backed by the database repository
    pub fn new(repository: Repository, config: AttendanceConfig) -> Self {
        Self::from_stores(
            Arc::new(repository.offices),
            Arc::new(repository.attendances),
            Arc::new(SystemClock),
            config,
        )
    }

    /// Create all services over explicit storage and clock
    pub fn from_stores(
        offices: Arc<dyn OfficeRegistry>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        config: AttendanceConfig,
    ) -> Self {
        Self {
            attendance: attendance::AttendanceService::new(
                offices.clone(),
                sessions.clone(),
                clock.clone(),
                config.clone(),
            ),
            offices: offices::OfficesService::new(offices.clone()),
            reports: reports::ReportsService::new(offices, sessions, clock, config),
        }
    }
}
