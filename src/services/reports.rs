//! Reporting service: read-only aggregation over attendance sessions

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    config::AttendanceConfig,
    error::{AppError, AppResult},
    models::{
        attendance::{
            AttendanceSession, Page, SessionOrder, SessionPage, SessionQuery, SessionStatus,
        },
        office::OfficeShort,
        report::{
            month_bounds, parse_date, parse_month, AttendanceOverview, AttendanceReport,
            AttendanceStatistics, DailyQuery, DailyReport, EmployeeMonthlySummary, MonthQuery,
            MonthlyReport, OfficeDailyGroup, ReportFilters, ReportQuery,
        },
    },
    repository::{OfficeRegistry, SessionStore},
};

use super::{local_date, Clock};

/// Rows fetched per store call when a report needs the whole range
const SCAN_BATCH: i64 = 500;

#[derive(Clone)]
pub struct ReportsService {
    offices: Arc<dyn OfficeRegistry>,
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    config: AttendanceConfig,
}

impl ReportsService {
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

    fn today(&self) -> NaiveDate {
        local_date(self.clock.now())
    }

    /// Every session matching `query`, fetched batch by batch
    async fn scan(&self, query: &SessionQuery) -> AppResult<Vec<AttendanceSession>> {
        let mut all = Vec::new();
        let mut offset = 0;
        loop {
            let batch = self
                .sessions
                .sessions_in_range(
                    query,
                    Page {
                        offset,
                        limit: SCAN_BATCH,
                    },
                )
                .await?;
            let fetched = batch.len() as i64;
            all.extend(batch);
            if fetched < SCAN_BATCH {
                return Ok(all);
            }
            offset += fetched;
        }
    }

    /// Statistics over the whole range matched by `query`
    pub async fn statistics(&self, query: &SessionQuery) -> AppResult<AttendanceStatistics> {
        let sessions = self.scan(query).await?;
        Ok(AttendanceStatistics::from_sessions(&sessions))
    }

    async fn page(
        &self,
        query: &SessionQuery,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> AppResult<SessionPage> {
        let page = page.unwrap_or(1).max(1);
        let per_page = self.config.page_size(per_page);
        let total = self.sessions.count_in_range(query).await?;
        let items = self
            .sessions
            .sessions_in_range(query, Page::number(page, per_page))
            .await?;

        Ok(SessionPage {
            items,
            total,
            page,
            per_page,
        })
    }

    async fn build_report(
        &self,
        filters: ReportFilters,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> AppResult<AttendanceReport> {
        let query = SessionQuery {
            employee_id: filters.employee_id,
            office_id: filters.office_id,
            start_date: Some(filters.start_date),
            end_date: Some(filters.end_date),
            ..Default::default()
        };

        let statistics = self.statistics(&query).await?;
        let sessions = self.page(&query, page, per_page).await?;

        Ok(AttendanceReport {
            statistics,
            sessions,
            filters,
        })
    }

    /// Resolve a date range, defaulting to the current month
    fn resolve_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> AppResult<(NaiveDate, NaiveDate)> {
        let (month_start, month_end) = month_bounds(self.today());
        let start = start.map(parse_date).transpose()?.unwrap_or(month_start);
        let end = end.map(parse_date).transpose()?.unwrap_or(month_end);

        if start > end {
            return Err(AppError::Validation(format!(
                "start_date {} is after end_date {}",
                start, end
            )));
        }
        Ok((start, end))
    }

    /// Filtered sessions in a date range plus their statistics
    pub async fn report(&self, query: ReportQuery) -> AppResult<AttendanceReport> {
        let (start_date, end_date) =
            self.resolve_range(query.start_date.as_deref(), query.end_date.as_deref())?;

        let filters = ReportFilters {
            start_date,
            end_date,
            office_id: query.office_id,
            employee_id: query.employee_id,
        };
        self.build_report(filters, query.page, query.per_page).await
    }

    /// Report restricted to one employee
    pub async fn employee_report(
        &self,
        employee_id: i64,
        query: ReportQuery,
    ) -> AppResult<AttendanceReport> {
        self.report(ReportQuery {
            employee_id: Some(employee_id),
            ..query
        })
        .await
    }

    /// An employee's own sessions over one month
    pub async fn history(&self, employee_id: i64, query: MonthQuery) -> AppResult<AttendanceReport> {
        let first = match query.month.as_deref() {
            Some(month) => parse_month(month)?,
            None => self.today(),
        };
        let (start_date, end_date) = month_bounds(first);

        let filters = ReportFilters {
            start_date,
            end_date,
            office_id: query.office_id,
            employee_id: Some(employee_id),
        };
        self.build_report(filters, query.page, query.per_page).await
    }

    /// Dashboard counters for today
    pub async fn overview(&self) -> AppResult<AttendanceOverview> {
        let date = self.today();

        let today_sessions = self
            .sessions
            .count_in_range(&SessionQuery {
                start_date: Some(date),
                end_date: Some(date),
                ..Default::default()
            })
            .await?;
        let open_sessions = self
            .sessions
            .count_in_range(&SessionQuery {
                status: Some(SessionStatus::Active),
                ..Default::default()
            })
            .await?;
        let active_offices = self.offices.list_active().await?.len() as i64;

        Ok(AttendanceOverview {
            date,
            today_sessions,
            open_sessions,
            active_offices,
        })
    }

    /// One day's sessions in check-in order, grouped by office
    pub async fn daily(&self, query: DailyQuery) -> AppResult<DailyReport> {
        let date = match query.date.as_deref() {
            Some(d) => parse_date(d)?,
            None => self.today(),
        };

        let sessions = self
            .scan(&SessionQuery {
                office_id: query.office_id,
                start_date: Some(date),
                end_date: Some(date),
                order: SessionOrder::OldestFirst,
                ..Default::default()
            })
            .await?;
        let total = sessions.len() as i64;

        let mut groups: Vec<OfficeDailyGroup> = Vec::new();
        let mut index: HashMap<i64, usize> = HashMap::new();
        for session in sessions {
            let slot = match index.get(&session.office_id) {
                Some(&slot) => slot,
                None => {
                    let office = self.office_short(session.office_id).await?;
                    groups.push(OfficeDailyGroup {
                        office,
                        sessions: Vec::new(),
                    });
                    index.insert(session.office_id, groups.len() - 1);
                    groups.len() - 1
                }
            };
            groups[slot].sessions.push(session);
        }

        Ok(DailyReport {
            date,
            office_id: query.office_id,
            total,
            groups,
        })
    }

    /// Per-employee rollups for one month
    pub async fn monthly(&self, query: MonthQuery) -> AppResult<MonthlyReport> {
        let first = match query.month.as_deref() {
            Some(month) => parse_month(month)?,
            None => self.today(),
        };
        let (start_date, end_date) = month_bounds(first);

        let sessions = self
            .scan(&SessionQuery {
                office_id: query.office_id,
                start_date: Some(start_date),
                end_date: Some(end_date),
                ..Default::default()
            })
            .await?;

        let mut per_employee: BTreeMap<i64, AttendanceStatistics> = BTreeMap::new();
        for session in &sessions {
            per_employee
                .entry(session.employee_id)
                .or_default()
                .add(session);
        }

        Ok(MonthlyReport {
            month: start_date.format("%Y-%m").to_string(),
            month_name: start_date.format("%B %Y").to_string(),
            office_id: query.office_id,
            employees: per_employee
                .into_iter()
                .map(|(employee_id, statistics)| EmployeeMonthlySummary {
                    employee_id,
                    statistics,
                })
                .collect(),
        })
    }

    async fn office_short(&self, office_id: i64) -> AppResult<OfficeShort> {
        match self.offices.get_office(office_id).await {
            Ok(office) => Ok(OfficeShort::from(&office)),
            Err(AppError::NotFound(_)) => {
                tracing::warn!(office_id, "Session references a missing office");
                Ok(OfficeShort {
                    id: office_id,
                    name: format!("Office #{}", office_id),
                    address: String::new(),
                })
            }
            Err(e) => Err(e),
        }
    }
}
