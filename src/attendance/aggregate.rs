//! Rollups over snapshots of attendance records. Nothing here does I/O and
//! nothing here fails: empty input yields zero-valued results.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;
use utoipa::ToSchema;

use crate::attendance::rules::round2;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, YearMonth};
use crate::model::employee::Employee;

/// Length of the trailing window used by [`weekly_trend`].
pub const TREND_DAYS: u64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlySummary {
    #[schema(value_type = String, example = "2026-01")]
    pub month: YearMonth,
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub half_day: u32,
    /// Days with a stored record; days without one are not counted.
    pub total_days_recorded: u32,
    pub total_hours: f64,
}

pub fn summarize(records: &[AttendanceRecord], employee_id: u64, month: YearMonth) -> MonthlySummary {
    let mut summary = MonthlySummary {
        month,
        present: 0,
        absent: 0,
        late: 0,
        half_day: 0,
        total_days_recorded: 0,
        total_hours: 0.0,
    };

    let mut hours = 0.0;
    for record in records
        .iter()
        .filter(|r| r.employee_id == employee_id && month.contains(r.date))
    {
        match record.status {
            AttendanceStatus::Present => summary.present += 1,
            AttendanceStatus::Late => summary.late += 1,
            AttendanceStatus::HalfDay => summary.half_day += 1,
            AttendanceStatus::Absent => summary.absent += 1,
        }
        summary.total_days_recorded += 1;
        hours += record.total_hours;
    }
    summary.total_hours = round2(hours);

    summary
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TodayCounts {
    pub present: u64,
    pub absent: u64,
    pub late: u64,
}

/// Arithmetic head-count for one day: `absent = total_employees - present`.
///
/// Records of other dates in `records` are ignored.
pub fn team_today(total_employees: u64, records: &[AttendanceRecord], date: NaiveDate) -> TodayCounts {
    let todays = records.iter().filter(|r| r.date == date);

    let (mut present, mut late) = (0u64, 0u64);
    for record in todays {
        if record.status.is_attending() {
            present += 1;
        }
        if record.status == AttendanceStatus::Late {
            late += 1;
        }
    }

    TodayCounts {
        present,
        absent: total_employees.saturating_sub(present),
        late,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TrendPoint {
    #[schema(value_type = String, example = "2026-01-15")]
    pub date: NaiveDate,
    pub present: u64,
    pub total_recorded: u64,
}

/// One point per day for the week ending at `reference` (inclusive), oldest first.
pub fn weekly_trend(records: &[AttendanceRecord], reference: NaiveDate) -> Vec<TrendPoint> {
    let start = trend_start(reference);

    let mut points: Vec<TrendPoint> = start
        .iter_days()
        .take(TREND_DAYS as usize)
        .map(|date| TrendPoint {
            date,
            present: 0,
            total_recorded: 0,
        })
        .collect();

    for record in records {
        if record.date < start || record.date > reference {
            continue;
        }
        let idx = (record.date - start).num_days() as usize;
        let point = &mut points[idx];
        point.total_recorded += 1;
        if record.status.is_attending() {
            point.present += 1;
        }
    }

    points
}

/// First day of the trend window ending at `reference`.
pub fn trend_start(reference: NaiveDate) -> NaiveDate {
    reference
        .checked_sub_days(Days::new(TREND_DAYS - 1))
        .unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DepartmentCount {
    /// `None` groups employees without a department.
    pub department: Option<String>,
    pub present: u64,
    pub total: u64,
}

/// Groups `date`'s records by their employee's department.
///
/// Records whose employee is not in `employees` are left out, the same way an
/// inner join would drop them.
pub fn department_rollup(
    records: &[AttendanceRecord],
    employees: &HashMap<u64, Employee>,
    date: NaiveDate,
) -> Vec<DepartmentCount> {
    let mut groups: BTreeMap<Option<String>, (u64, u64)> = BTreeMap::new();

    for record in records.iter().filter(|r| r.date == date) {
        let Some(employee) = employees.get(&record.employee_id) else {
            continue;
        };
        let entry = groups.entry(employee.department.clone()).or_default();
        if record.status.is_attending() {
            entry.0 += 1;
        }
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(department, (present, total))| DepartmentCount {
            department,
            present,
            total,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PresentEntry {
    pub employee_id: u64,
    pub name: String,
    pub employee_code: String,
    #[schema(value_type = Option<String>)]
    pub check_in_time: Option<NaiveDateTime>,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AbsentEntry {
    pub employee_id: u64,
    pub name: String,
    pub employee_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Roster {
    pub present: Vec<PresentEntry>,
    pub absent: Vec<AbsentEntry>,
}

/// Who is in and who is not on `date`.
///
/// `absent` is the set difference between `roster` and the present list, so
/// an employee with a half-day or absent record is listed as absent.
pub fn today_roster(
    records: &[AttendanceRecord],
    employees: &HashMap<u64, Employee>,
    roster: &[Employee],
    date: NaiveDate,
) -> Roster {
    let present: Vec<PresentEntry> = records
        .iter()
        .filter(|r| r.date == date && r.status.is_attending())
        .filter_map(|r| {
            employees.get(&r.employee_id).map(|e| PresentEntry {
                employee_id: e.id,
                name: e.name.clone(),
                employee_code: e.employee_code.clone(),
                check_in_time: r.check_in_time,
                status: r.status,
            })
        })
        .collect();

    let present_ids: HashSet<u64> = present.iter().map(|p| p.employee_id).collect();
    let absent = roster
        .iter()
        .filter(|e| !present_ids.contains(&e.id))
        .map(|e| AbsentEntry {
            employee_id: e.id,
            name: e.name.clone(),
            employee_code: e.employee_code.clone(),
        })
        .collect();

    Roster { present, absent }
}

/// Indexes employees by id for the join-based rollups.
pub fn index_employees(employees: Vec<Employee>) -> HashMap<u64, Employee> {
    employees.into_iter().map(|e| (e.id, e)).collect()
}
