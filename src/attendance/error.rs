use derive_more::Display;

/// Failures surfaced by the attendance core.
///
/// State conflicts are deterministic given the stored record and are never
/// retried here; `StoreUnavailable` carries the infrastructure message for
/// logging only.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum AttendanceError {
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "Already checked in for today")]
    AlreadyCheckedIn,

    #[display(fmt = "Already checked out for today")]
    AlreadyCheckedOut,

    #[display(fmt = "No check-in found for today")]
    NoCheckIn,

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    Forbidden(String),

    #[display(fmt = "store unavailable: {}", _0)]
    StoreUnavailable(String),
}

impl std::error::Error for AttendanceError {}

/// Errors reported by record stores and the employee directory.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum StoreError {
    /// The `(employee_id, date)` unique key already holds a record.
    #[display(fmt = "duplicate attendance key")]
    DuplicateKey,

    #[display(fmt = "{}", _0)]
    Unavailable(String),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        // SQLSTATE 23000 also covers foreign-key and NOT NULL failures, so
        // only a unique-key violation counts as a duplicate
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return StoreError::DuplicateKey;
            }
        }
        StoreError::Unavailable(e.to_string())
    }
}

impl From<StoreError> for AttendanceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey => AttendanceError::StoreUnavailable(e.to_string()),
            StoreError::Unavailable(msg) => AttendanceError::StoreUnavailable(msg),
        }
    }
}
