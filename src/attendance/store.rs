use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::attendance::error::StoreError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, YearMonth};
use crate::model::employee::Employee;
use crate::model::role::Role;

pub const DEFAULT_PAGE_LIMIT: u32 = 50;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Page {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(None, None)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Paged<T> {
    pub fn new(items: Vec<T>, total: u64, page: Page) -> Self {
        Paged {
            items,
            total,
            page: page.page,
            limit: page.limit,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Record selection used by listing queries. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub employee_id: Option<u64>,
    pub date: Option<NaiveDate>,
    pub month: Option<YearMonth>,
    pub status: Option<AttendanceStatus>,
}

impl RecordFilter {
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.employee_id.is_none_or(|id| record.employee_id == id)
            && self.date.is_none_or(|d| record.date == d)
            && self.month.is_none_or(|m| m.contains(record.date))
            && self.status.is_none_or(|s| record.status == s)
    }
}

/// Inclusive date range, either end open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

/// Persistence for attendance records, unique on `(employee_id, date)`.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    /// Must fail with [`StoreError::DuplicateKey`] when the key is taken.
    async fn insert(&self, record: &AttendanceRecord) -> Result<(), StoreError>;

    async fn update(&self, record: &AttendanceRecord) -> Result<(), StoreError>;

    /// Filtered page, newest date first.
    async fn query(
        &self,
        filter: &RecordFilter,
        page: Page,
    ) -> Result<Paged<AttendanceRecord>, StoreError>;

    /// Every record matching the filter, newest date first.
    async fn list(&self, filter: &RecordFilter) -> Result<Vec<AttendanceRecord>, StoreError>;

    /// Records inside `range`, oldest date first.
    async fn list_range(
        &self,
        range: DateRange,
        employee_id: Option<u64>,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;
}

/// Read-only view of the employee directory.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn find_by_id(&self, id: u64) -> Result<Option<Employee>, StoreError>;

    async fn find_by_employee_code(&self, code: &str) -> Result<Option<Employee>, StoreError>;

    async fn count_by_role(&self, role: Role) -> Result<u64, StoreError>;

    async fn list_by_role(&self, role: Role) -> Result<Vec<Employee>, StoreError>;

    async fn list_all(&self) -> Result<Vec<Employee>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_clamps() {
        assert_eq!(Page::default(), Page { page: 1, limit: 50 });
        assert_eq!(Page::new(Some(0), Some(0)), Page { page: 1, limit: 1 });
        assert_eq!(Page::new(Some(3), Some(500)), Page { page: 3, limit: 100 });
        assert_eq!(Page::new(Some(3), Some(20)).offset(), 40);
    }

    #[test]
    fn date_range_is_inclusive_and_open_ended() {
        let d = |day| NaiveDate::from_ymd_opt(2026, 5, day).unwrap();
        let range = DateRange::between(d(3), d(5));
        assert!(!range.contains(d(2)));
        assert!(range.contains(d(3)));
        assert!(range.contains(d(5)));
        assert!(!range.contains(d(6)));
        assert!(DateRange::default().contains(d(1)));
        assert!(DateRange { start: Some(d(4)), end: None }.contains(d(31)));
    }
}
