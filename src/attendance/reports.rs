use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::attendance::aggregate::{
    self, DepartmentCount, MonthlySummary, Roster, TodayCounts, TrendPoint,
};
use crate::attendance::error::AttendanceError;
use crate::attendance::store::{
    AttendanceStore, DateRange, EmployeeDirectory, Page, Paged, RecordFilter,
};
use crate::attendance::transition::today;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, YearMonth};
use crate::model::employee::{Employee, EmployeeRef};
use crate::model::role::Role;

/// ISO-8601 local timestamp with milliseconds, as written to exports.
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

pub async fn history(
    store: &dyn AttendanceStore,
    employee_id: u64,
    month: Option<YearMonth>,
    page: Page,
) -> Result<Paged<AttendanceRecord>, AttendanceError> {
    let filter = RecordFilter {
        employee_id: Some(employee_id),
        month,
        ..RecordFilter::default()
    };
    Ok(store.query(&filter, page).await?)
}

pub async fn monthly_summary(
    store: &dyn AttendanceStore,
    employee_id: u64,
    month: YearMonth,
) -> Result<MonthlySummary, AttendanceError> {
    let filter = RecordFilter {
        employee_id: Some(employee_id),
        month: Some(month),
        ..RecordFilter::default()
    };
    let records = store.list(&filter).await?;
    Ok(aggregate::summarize(&records, employee_id, month))
}

/// Manager-side listing filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamFilter {
    /// Resolved through the employee directory; unknown codes are `NotFound`.
    pub employee_code: Option<String>,
    /// Takes precedence over `employee_code` once that has resolved.
    pub employee_id: Option<u64>,
    pub date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TeamRecord {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    /// `None` when the directory no longer knows the employee.
    pub employee: Option<EmployeeRef>,
}

pub async fn team_query(
    store: &dyn AttendanceStore,
    directory: &dyn EmployeeDirectory,
    filter: TeamFilter,
    page: Page,
) -> Result<Paged<TeamRecord>, AttendanceError> {
    let mut record_filter = RecordFilter {
        date: filter.date,
        status: filter.status,
        ..RecordFilter::default()
    };

    if let Some(code) = filter.employee_code.as_deref() {
        record_filter.employee_id = Some(resolve_code(directory, code).await?.id);
    }
    if let Some(id) = filter.employee_id {
        record_filter.employee_id = Some(id);
    }

    let records = store.query(&record_filter, page).await?;
    let employees = aggregate::index_employees(directory.list_all().await?);

    Ok(records.map(|record| TeamRecord {
        employee: employees.get(&record.employee_id).map(EmployeeRef::from),
        record,
    }))
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TeamSummary {
    pub total_employees: u64,
    pub todays: TodayCounts,
    pub weekly_trend: Vec<TrendPoint>,
    pub department_wise: Vec<DepartmentCount>,
}

/// Today's head-count, the trailing week and the per-department split.
pub async fn team_summary(
    store: &dyn AttendanceStore,
    directory: &dyn EmployeeDirectory,
    now: NaiveDateTime,
) -> Result<TeamSummary, AttendanceError> {
    let date = today(now);
    let total_employees = directory.count_by_role(Role::Employee).await?;

    let window = DateRange::between(aggregate::trend_start(date), date);
    let records = store.list_range(window, None).await?;
    let employees = aggregate::index_employees(directory.list_all().await?);

    debug!(%date, total_employees, records = records.len(), "Building team summary");

    Ok(TeamSummary {
        total_employees,
        todays: aggregate::team_today(total_employees, &records, date),
        weekly_trend: aggregate::weekly_trend(&records, date),
        department_wise: aggregate::department_rollup(&records, &employees, date),
    })
}

pub async fn today_roster(
    store: &dyn AttendanceStore,
    directory: &dyn EmployeeDirectory,
    now: NaiveDateTime,
) -> Result<Roster, AttendanceError> {
    let date = today(now);
    let filter = RecordFilter {
        date: Some(date),
        ..RecordFilter::default()
    };

    let records = store.list(&filter).await?;
    let employees = aggregate::index_employees(directory.list_all().await?);
    let roster = directory.list_by_role(Role::Employee).await?;

    Ok(aggregate::today_roster(&records, &employees, &roster, date))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub employee_code: Option<String>,
    /// Same precedence as [`TeamFilter::employee_id`].
    pub employee_id: Option<u64>,
}

/// One flattened export line. Field names are the export column headers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub date: String,
    pub employee_code: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub check_in_time: String,
    pub check_out_time: String,
    pub status: String,
    pub total_hours: String,
}

impl ExportRow {
    fn new(record: &AttendanceRecord, employee: Option<&Employee>) -> Self {
        let timestamp = |t: Option<NaiveDateTime>| {
            t.map(|t| t.format(EXPORT_TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default()
        };

        ExportRow {
            date: record.date.to_string(),
            employee_code: employee.map(|e| e.employee_code.clone()).unwrap_or_default(),
            name: employee.map(|e| e.name.clone()).unwrap_or_default(),
            email: employee.map(|e| e.email.clone()).unwrap_or_default(),
            department: employee.and_then(|e| e.department.clone()).unwrap_or_default(),
            check_in_time: timestamp(record.check_in_time),
            check_out_time: timestamp(record.check_out_time),
            status: record.status.to_string(),
            total_hours: format!("{:.2}", record.total_hours),
        }
    }
}

/// Rows for a date range, oldest first.
pub async fn export_range(
    store: &dyn AttendanceStore,
    directory: &dyn EmployeeDirectory,
    filter: ExportFilter,
) -> Result<Vec<ExportRow>, AttendanceError> {
    let mut employee_id = None;
    if let Some(code) = filter.employee_code.as_deref() {
        employee_id = Some(resolve_code(directory, code).await?.id);
    }
    if let Some(id) = filter.employee_id {
        employee_id = Some(id);
    }

    let range = DateRange {
        start: filter.start,
        end: filter.end,
    };
    let records = store.list_range(range, employee_id).await?;
    let employees = aggregate::index_employees(directory.list_all().await?);

    Ok(records
        .iter()
        .map(|r| ExportRow::new(r, employees.get(&r.employee_id)))
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeAttendance {
    pub employee: EmployeeRef,
    pub items: Vec<AttendanceRecord>,
}

/// All records of one employee, newest first. `identifier` is either the
/// numeric id or the employee code.
pub async fn employee_attendance(
    store: &dyn AttendanceStore,
    directory: &dyn EmployeeDirectory,
    identifier: &str,
) -> Result<EmployeeAttendance, AttendanceError> {
    let identifier = identifier.trim();
    let employee = match identifier.parse::<u64>() {
        Ok(id) => directory.find_by_id(id).await?,
        Err(_) => directory.find_by_employee_code(identifier).await?,
    }
    .ok_or_else(|| AttendanceError::NotFound("Employee not found".to_string()))?;

    let filter = RecordFilter {
        employee_id: Some(employee.id),
        ..RecordFilter::default()
    };
    let items = store.list(&filter).await?;

    Ok(EmployeeAttendance {
        employee: EmployeeRef::from(&employee),
        items,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeDashboard {
    pub today: Option<AttendanceRecord>,
    pub monthly: MonthlySummary,
}

pub async fn employee_dashboard(
    store: &dyn AttendanceStore,
    employee_id: u64,
    now: NaiveDateTime,
) -> Result<EmployeeDashboard, AttendanceError> {
    let date = today(now);
    let today_record = store.find(employee_id, date).await?;
    let monthly = monthly_summary(store, employee_id, YearMonth::of(date)).await?;

    Ok(EmployeeDashboard {
        today: today_record,
        monthly,
    })
}

async fn resolve_code(
    directory: &dyn EmployeeDirectory,
    code: &str,
) -> Result<Employee, AttendanceError> {
    directory
        .find_by_employee_code(code.trim())
        .await?
        .ok_or_else(|| AttendanceError::NotFound(format!("Employee {} not found", code.trim())))
}
