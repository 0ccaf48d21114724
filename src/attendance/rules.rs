//! Status rules: the only place that knows about the late cut-off and the
//! half-day threshold.

use chrono::{NaiveDateTime, Timelike};

use crate::model::attendance::AttendanceStatus;

/// Check-ins strictly after 09:30 are late.
pub const LATE_AFTER_HOUR: u32 = 9;
pub const LATE_AFTER_MINUTE: u32 = 30;

/// Days shorter than this many hours become half-days at check-out.
pub const HALF_DAY_BELOW_HOURS: f64 = 4.0;

const MILLIS_PER_HOUR: i64 = 3_600_000;

pub fn derive_check_in_status(check_in: NaiveDateTime) -> AttendanceStatus {
    let (hour, minute) = (check_in.hour(), check_in.minute());
    if hour > LATE_AFTER_HOUR || (hour == LATE_AFTER_HOUR && minute > LATE_AFTER_MINUTE) {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    }
}

/// Hours between the two timestamps, rounded half-up to 2 decimals.
///
/// Rounding is done on integer milliseconds so that a value like 2.345h is
/// not pushed down by binary floating point.
pub fn compute_duration(check_in: NaiveDateTime, check_out: NaiveDateTime) -> f64 {
    let millis = (check_out - check_in).num_milliseconds();
    let hundredths = if millis >= 0 {
        (millis * 100 + MILLIS_PER_HOUR / 2) / MILLIS_PER_HOUR
    } else {
        -((-millis * 100 + MILLIS_PER_HOUR / 2) / MILLIS_PER_HOUR)
    };
    hundredths as f64 / 100.0
}

pub fn derive_check_out_status(prior: AttendanceStatus, hours: f64) -> AttendanceStatus {
    if hours < HALF_DAY_BELOW_HOURS {
        AttendanceStatus::HalfDay
    } else if prior == AttendanceStatus::Late {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    }
}

/// Rounds an accumulated hour total to 2 decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
