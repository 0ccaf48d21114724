use crate::attendance::store::{DateRange, RecordFilter};
use crate::model::attendance::DATE_FORMAT;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
}

/// ===============================
/// Dynamic WHERE clause container
/// ===============================
#[derive(Debug, Default)]
pub struct WhereClause {
    conditions: Vec<&'static str>,
    values: Vec<SqlValue>,
}

impl WhereClause {
    pub fn push(&mut self, condition: &'static str, value: SqlValue) {
        self.conditions.push(condition);
        self.values.push(value);
    }

    /// `WHERE a AND b`, or an empty string when nothing was pushed.
    pub fn sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

/// ===============================
/// Build WHERE for attendance listings
/// ===============================
pub fn record_filter_clause(filter: &RecordFilter) -> WhereClause {
    let mut clause = WhereClause::default();

    if let Some(employee_id) = filter.employee_id {
        clause.push("employee_id = ?", SqlValue::U64(employee_id));
    }

    if let Some(date) = filter.date {
        clause.push(
            "date = ?",
            SqlValue::String(date.format(DATE_FORMAT).to_string()),
        );
    }

    // dates are stored as YYYY-MM-DD text, so a month is a prefix match
    if let Some(month) = filter.month {
        clause.push("date LIKE ?", SqlValue::String(month.like_pattern()));
    }

    if let Some(status) = filter.status {
        clause.push("status = ?", SqlValue::String(status.to_string()));
    }

    clause
}

/// ===============================
/// Build WHERE for date-range reads
/// ===============================
pub fn date_range_clause(range: DateRange, employee_id: Option<u64>) -> WhereClause {
    let mut clause = WhereClause::default();

    if let Some(employee_id) = employee_id {
        clause.push("employee_id = ?", SqlValue::U64(employee_id));
    }

    if let Some(start) = range.start {
        clause.push(
            "date >= ?",
            SqlValue::String(start.format(DATE_FORMAT).to_string()),
        );
    }

    if let Some(end) = range.end {
        clause.push(
            "date <= ?",
            SqlValue::String(end.format(DATE_FORMAT).to_string()),
        );
    }

    clause
}
