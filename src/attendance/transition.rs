//! Per-day check-in / check-out state machine:
//! `NoRecord -> CheckedIn -> CheckedOut`.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::attendance::error::{AttendanceError, StoreError};
use crate::attendance::rules::{compute_duration, derive_check_in_status, derive_check_out_status};
use crate::attendance::store::AttendanceStore;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

/// The calendar day a timestamp belongs to. Every operation derives "today"
/// through this so they agree at midnight.
pub fn today(now: NaiveDateTime) -> NaiveDate {
    now.date()
}

#[instrument(skip(store))]
pub async fn check_in(
    store: &dyn AttendanceStore,
    employee_id: u64,
    now: NaiveDateTime,
) -> Result<AttendanceRecord, AttendanceError> {
    let date = today(now);
    let status = derive_check_in_status(now);

    match store.find(employee_id, date).await? {
        Some(existing) if existing.is_checked_in() => {
            warn!(employee_id, %date, "Already checked in");
            Err(AttendanceError::AlreadyCheckedIn)
        }
        // a pre-existing record without a check-in (e.g. marked absent) is taken over
        Some(mut existing) => {
            existing.check_in_time = Some(now);
            existing.status = status;
            store.update(&existing).await?;
            info!(employee_id, %date, %status, "Checked in over existing record");
            Ok(existing)
        }
        None => {
            let record = AttendanceRecord {
                employee_id,
                date,
                check_in_time: Some(now),
                check_out_time: None,
                status,
                total_hours: 0.0,
            };
            match store.insert(&record).await {
                Ok(()) => {
                    info!(employee_id, %date, %status, "Checked in");
                    Ok(record)
                }
                // lost a race with a concurrent check-in for the same day
                Err(StoreError::DuplicateKey) => {
                    warn!(employee_id, %date, "Duplicate check-in rejected by store");
                    Err(AttendanceError::AlreadyCheckedIn)
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}

#[instrument(skip(store))]
pub async fn check_out(
    store: &dyn AttendanceStore,
    employee_id: u64,
    now: NaiveDateTime,
) -> Result<AttendanceRecord, AttendanceError> {
    let date = today(now);

    let mut record = store
        .find(employee_id, date)
        .await?
        .filter(AttendanceRecord::is_checked_in)
        .ok_or_else(|| {
            warn!(employee_id, %date, "Check-out without check-in");
            AttendanceError::NoCheckIn
        })?;

    if record.is_checked_out() {
        warn!(employee_id, %date, "Already checked out");
        return Err(AttendanceError::AlreadyCheckedOut);
    }

    let check_in_time = record.check_in_time.ok_or(AttendanceError::NoCheckIn)?;
    if now < check_in_time {
        return Err(AttendanceError::Validation(
            "Check-out time precedes check-in time".to_string(),
        ));
    }

    let hours = compute_duration(check_in_time, now);
    record.check_out_time = Some(now);
    record.total_hours = hours;
    record.status = derive_check_out_status(record.status, hours);

    store.update(&record).await?;
    info!(employee_id, %date, hours, status = %record.status, "Checked out");

    Ok(record)
}

/// Status label for the current day, including the synthetic `not_checked_in`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayState {
    NotCheckedIn,
    Recorded(AttendanceStatus),
}

impl DayState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayState::NotCheckedIn => "not_checked_in",
            DayState::Recorded(AttendanceStatus::Present) => "present",
            DayState::Recorded(AttendanceStatus::Late) => "late",
            DayState::Recorded(AttendanceStatus::HalfDay) => "half-day",
            DayState::Recorded(AttendanceStatus::Absent) => "absent",
        }
    }
}

impl Serialize for DayState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TodayStatus {
    #[schema(value_type = String, example = "late")]
    pub status: DayState,

    #[schema(value_type = Option<String>, example = "2026-01-15T09:45:00")]
    pub check_in_time: Option<NaiveDateTime>,

    #[schema(value_type = Option<String>, example = "2026-01-15T14:45:00")]
    pub check_out_time: Option<NaiveDateTime>,

    #[schema(example = 5.0)]
    pub total_hours: f64,
}

pub async fn today_status(
    store: &dyn AttendanceStore,
    employee_id: u64,
    now: NaiveDateTime,
) -> Result<TodayStatus, AttendanceError> {
    let status = match store.find(employee_id, today(now)).await? {
        None => TodayStatus {
            status: DayState::NotCheckedIn,
            check_in_time: None,
            check_out_time: None,
            total_hours: 0.0,
        },
        Some(record) => TodayStatus {
            status: DayState::Recorded(record.status),
            check_in_time: record.check_in_time,
            check_out_time: record.check_out_time,
            total_hours: record.total_hours,
        },
    };

    Ok(status)
}
