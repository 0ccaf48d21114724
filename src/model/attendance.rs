use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::attendance::error::AttendanceError;

/// Canonical on-disk / on-wire form of a record date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Late,
    HalfDay,
    Absent,
}

impl AttendanceStatus {
    /// `present` and `late` both count as attending.
    pub fn is_attending(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

/// One employee's attendance for one calendar day, keyed by `(employee_id, date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub employee_id: u64,

    #[schema(example = "2026-01-15", value_type = String)]
    pub date: NaiveDate,

    #[schema(example = "2026-01-15T09:12:00", value_type = Option<String>, nullable = true)]
    pub check_in_time: Option<NaiveDateTime>,

    #[schema(example = "2026-01-15T17:40:00", value_type = Option<String>, nullable = true)]
    pub check_out_time: Option<NaiveDateTime>,

    pub status: AttendanceStatus,

    #[schema(example = 8.47)]
    pub total_hours: f64,
}

impl AttendanceRecord {
    pub fn is_checked_in(&self) -> bool {
        self.check_in_time.is_some()
    }

    pub fn is_checked_out(&self) -> bool {
        self.check_out_time.is_some()
    }
}

/// Raw `attendance` row as stored in MySQL.
#[derive(Debug, sqlx::FromRow)]
pub struct AttendanceRow {
    pub employee_id: u64,
    pub date: String,
    pub check_in_time: Option<NaiveDateTime>,
    pub check_out_time: Option<NaiveDateTime>,
    pub status: String,
    pub total_hours: f64,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = String;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT)
            .map_err(|e| format!("invalid attendance date {:?}: {}", row.date, e))?;
        let status = AttendanceStatus::from_str(&row.status)
            .map_err(|_| format!("invalid attendance status {:?}", row.status))?;

        Ok(AttendanceRecord {
            employee_id: row.employee_id,
            date,
            check_in_time: row.check_in_time,
            check_out_time: row.check_out_time,
            status,
            total_hours: row.total_hours,
        })
    }
}

/// A calendar month in `YYYY-MM` form, used to select records by date prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, AttendanceError> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(AttendanceError::Validation(format!(
                "month must be YYYY-MM, got {:04}-{:02}",
                year, month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// `LIKE` pattern selecting this month's dates.
    pub fn like_pattern(&self) -> String {
        format!("{}-%", self)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AttendanceError::Validation(format!("month must be YYYY-MM, got {:?}", s));

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        YearMonth::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = AttendanceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Parses a `YYYY-MM-DD` query value.
pub fn parse_date(value: &str) -> Result<NaiveDate, AttendanceError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| AttendanceError::Validation(format!("date must be YYYY-MM-DD, got {:?}", value)))
}
