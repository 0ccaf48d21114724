use std::sync::Arc;

use sqlx::MySqlPool;

use crate::attendance::clock::{Clock, SystemClock};
use crate::attendance::store::{AttendanceStore, EmployeeDirectory};
use crate::db::{MySqlAttendanceStore, MySqlEmployeeDirectory};

/// Shared handles for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AttendanceStore>,
    pub directory: Arc<dyn EmployeeDirectory>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn mysql(pool: MySqlPool) -> Self {
        AppState {
            store: Arc::new(MySqlAttendanceStore::new(pool.clone())),
            directory: Arc::new(MySqlEmployeeDirectory::new(pool)),
            clock: Arc::new(SystemClock),
        }
    }
}
