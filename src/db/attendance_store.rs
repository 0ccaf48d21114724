use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;
use tracing::{debug, error};

use crate::attendance::error::StoreError;
use crate::attendance::store::{AttendanceStore, DateRange, Page, Paged, RecordFilter};
use crate::model::attendance::{AttendanceRecord, AttendanceRow, DATE_FORMAT};
use crate::utils::db_utils::{SqlValue, date_range_clause, record_filter_clause};

const SELECT_ATTENDANCE: &str = r#"
    SELECT employee_id, date, check_in_time, check_out_time, status, total_hours
    FROM attendance
"#;

/// MySQL-backed record store. The `(employee_id, date)` unique key does the
/// concurrency control for check-ins.
#[derive(Clone)]
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, sql: &str, values: &[SqlValue]) -> Result<Vec<AttendanceRecord>, StoreError> {
        debug!(sql = %sql, bindings = ?values, "Fetching attendance");

        let mut query = sqlx::query_as::<_, AttendanceRow>(sql);
        for value in values {
            query = match value {
                SqlValue::String(v) => query.bind(v.as_str()),
                SqlValue::U64(v) => query.bind(*v),
            };
        }

        let rows = query.fetch_all(&self.pool).await.map_err(|e| {
            error!(error = %e, sql = %sql, "Failed to fetch attendance");
            StoreError::from(e)
        })?;

        rows.into_iter().map(to_record).collect()
    }

    async fn count(&self, sql: &str, values: &[SqlValue]) -> Result<u64, StoreError> {
        debug!(sql = %sql, bindings = ?values, "Counting attendance");

        let mut query = sqlx::query_scalar::<_, i64>(sql);
        for value in values {
            query = match value {
                SqlValue::String(v) => query.bind(v.as_str()),
                SqlValue::U64(v) => query.bind(*v),
            };
        }

        let total = query.fetch_one(&self.pool).await.map_err(|e| {
            error!(error = %e, sql = %sql, "Failed to count attendance");
            StoreError::from(e)
        })?;

        Ok(total.max(0) as u64)
    }
}

fn to_record(row: AttendanceRow) -> Result<AttendanceRecord, StoreError> {
    AttendanceRecord::try_from(row).map_err(|e| {
        error!(error = %e, "Malformed attendance row");
        StoreError::Unavailable(e)
    })
}

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn find(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let sql = format!("{} WHERE employee_id = ? AND date = ?", SELECT_ATTENDANCE);

        let row = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(employee_id)
            .bind(date_key(date))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, employee_id, %date, "Failed to fetch attendance record");
                StoreError::from(e)
            })?;

        row.map(to_record).transpose()
    }

    async fn insert(&self, record: &AttendanceRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO attendance
            (employee_id, date, check_in_time, check_out_time, status, total_hours)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.employee_id)
        .bind(date_key(record.date))
        .bind(record.check_in_time)
        .bind(record.check_out_time)
        .bind(record.status.to_string())
        .bind(record.total_hours)
        .execute(&self.pool)
        .await
        .map_err(|e| match StoreError::from(e) {
            // Duplicate check-in for same day
            StoreError::DuplicateKey => StoreError::DuplicateKey,
            other => {
                error!(error = %other, employee_id = record.employee_id, "Insert attendance failed");
                other
            }
        })?;

        Ok(())
    }

    async fn update(&self, record: &AttendanceRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET check_in_time = ?, check_out_time = ?, status = ?, total_hours = ?
            WHERE employee_id = ?
            AND date = ?
            "#,
        )
        .bind(record.check_in_time)
        .bind(record.check_out_time)
        .bind(record.status.to_string())
        .bind(record.total_hours)
        .bind(record.employee_id)
        .bind(date_key(record.date))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, employee_id = record.employee_id, "Update attendance failed");
            StoreError::from(e)
        })?;

        if result.rows_affected() == 0 {
            debug!(employee_id = record.employee_id, date = %record.date, "Update matched no changed row");
        }

        Ok(())
    }

    async fn query(
        &self,
        filter: &RecordFilter,
        page: Page,
    ) -> Result<Paged<AttendanceRecord>, StoreError> {
        let clause = record_filter_clause(filter);

        let count_sql = format!("SELECT COUNT(*) FROM attendance {}", clause.sql());
        let total = self.count(&count_sql, clause.values()).await?;

        let data_sql = format!(
            "{} {} ORDER BY date DESC, employee_id ASC LIMIT {} OFFSET {}",
            SELECT_ATTENDANCE,
            clause.sql(),
            page.limit,
            page.offset()
        );
        let items = self.fetch(&data_sql, clause.values()).await?;

        Ok(Paged::new(items, total, page))
    }

    async fn list(&self, filter: &RecordFilter) -> Result<Vec<AttendanceRecord>, StoreError> {
        let clause = record_filter_clause(filter);
        let sql = format!(
            "{} {} ORDER BY date DESC, employee_id ASC",
            SELECT_ATTENDANCE,
            clause.sql()
        );
        self.fetch(&sql, clause.values()).await
    }

    async fn list_range(
        &self,
        range: DateRange,
        employee_id: Option<u64>,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let clause = date_range_clause(range, employee_id);
        let sql = format!(
            "{} {} ORDER BY date ASC, employee_id ASC",
            SELECT_ATTENDANCE,
            clause.sql()
        );
        self.fetch(&sql, clause.values()).await
    }
}
