//! In-memory store, directory and fixtures for unit tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::attendance::clock::Clock;
use crate::attendance::error::StoreError;
use crate::attendance::store::{
    AttendanceStore, DateRange, EmployeeDirectory, Page, Paged, RecordFilter,
};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::Employee;
use crate::model::role::Role;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    date.and_hms_opt(h, m, 0).unwrap()
}

pub fn employee(id: u64, code: &str, department: Option<&str>) -> Employee {
    Employee {
        id,
        employee_code: code.to_string(),
        name: format!("Employee {id}"),
        email: format!("{}@company.com", code.to_lowercase()),
        department: department.map(str::to_string),
        role: Role::Employee,
    }
}

pub fn manager(id: u64, code: &str) -> Employee {
    Employee {
        role: Role::Manager,
        ..employee(id, code, Some("Management"))
    }
}

/// A record with a 09:00 check-in and no check-out.
pub fn record(employee_id: u64, date: NaiveDate, status: AttendanceStatus) -> AttendanceRecord {
    AttendanceRecord {
        employee_id,
        date,
        check_in_time: Some(at(date, 9, 0)),
        check_out_time: None,
        status,
        total_hours: 0.0,
    }
}

pub fn with_hours(mut record: AttendanceRecord, hours: f64) -> AttendanceRecord {
    record.total_hours = hours;
    record
}

pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<BTreeMap<(u64, NaiveDate), AttendanceRecord>>,
    duplicate_on_next_insert: AtomicBool,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn with(records: impl IntoIterator<Item = AttendanceRecord>) -> Self {
        let store = InMemoryStore::default();
        for r in records {
            store.put(r);
        }
        store
    }

    pub fn put(&self, record: AttendanceRecord) {
        self.records
            .lock()
            .unwrap()
            .insert((record.employee_id, record.date), record);
    }

    pub fn get(&self, employee_id: u64, date: NaiveDate) -> Option<AttendanceRecord> {
        self.records.lock().unwrap().get(&(employee_id, date)).cloned()
    }

    pub fn fail_next_insert_with_duplicate(&self) {
        self.duplicate_on_next_insert.store(true, Ordering::SeqCst);
    }

    pub fn go_offline(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    fn newest_first(&self, filter: &RecordFilter) -> Vec<AttendanceRecord> {
        let mut items: Vec<AttendanceRecord> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.date.cmp(&a.date).then(a.employee_id.cmp(&b.employee_id)));
        items
    }
}

#[async_trait]
impl AttendanceStore for InMemoryStore {
    async fn find(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        self.check_online()?;
        Ok(self.get(employee_id, date))
    }

    async fn insert(&self, record: &AttendanceRecord) -> Result<(), StoreError> {
        self.check_online()?;
        if self.duplicate_on_next_insert.swap(false, Ordering::SeqCst) {
            return Err(StoreError::DuplicateKey);
        }
        let mut records = self.records.lock().unwrap();
        let key = (record.employee_id, record.date);
        if records.contains_key(&key) {
            return Err(StoreError::DuplicateKey);
        }
        records.insert(key, record.clone());
        Ok(())
    }

    async fn update(&self, record: &AttendanceRecord) -> Result<(), StoreError> {
        self.check_online()?;
        self.put(record.clone());
        Ok(())
    }

    async fn query(
        &self,
        filter: &RecordFilter,
        page: Page,
    ) -> Result<Paged<AttendanceRecord>, StoreError> {
        self.check_online()?;
        let all = self.newest_first(filter);
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok(Paged::new(items, total, page))
    }

    async fn list(&self, filter: &RecordFilter) -> Result<Vec<AttendanceRecord>, StoreError> {
        self.check_online()?;
        Ok(self.newest_first(filter))
    }

    async fn list_range(
        &self,
        range: DateRange,
        employee_id: Option<u64>,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        self.check_online()?;
        let mut items: Vec<AttendanceRecord> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| range.contains(r.date))
            .filter(|r| employee_id.is_none_or(|id| r.employee_id == id))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.date.cmp(&b.date).then(a.employee_id.cmp(&b.employee_id)));
        Ok(items)
    }
}

#[derive(Default)]
pub struct InMemoryDirectory {
    employees: Vec<Employee>,
}

impl InMemoryDirectory {
    pub fn new(employees: Vec<Employee>) -> Self {
        InMemoryDirectory { employees }
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryDirectory {
    async fn find_by_id(&self, id: u64) -> Result<Option<Employee>, StoreError> {
        Ok(self.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_employee_code(&self, code: &str) -> Result<Option<Employee>, StoreError> {
        Ok(self.employees.iter().find(|e| e.employee_code == code).cloned())
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, StoreError> {
        Ok(self.employees.iter().filter(|e| e.role == role).count() as u64)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<Employee>, StoreError> {
        Ok(self.employees.iter().filter(|e| e.role == role).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<Employee>, StoreError> {
        Ok(self.employees.clone())
    }
}
