use async_trait::async_trait;
use sqlx::MySqlPool;
use tracing::error;

use crate::attendance::error::StoreError;
use crate::attendance::store::EmployeeDirectory;
use crate::model::employee::{Employee, EmployeeRow};
use crate::model::role::Role;

const SELECT_EMPLOYEE: &str = r#"
    SELECT e.id, e.employee_code, e.name, e.email, d.name AS department, e.role
    FROM employees e
    LEFT JOIN departments d ON d.id = e.department_id
"#;

#[derive(Clone)]
pub struct MySqlEmployeeDirectory {
    pool: MySqlPool,
}

impl MySqlEmployeeDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn to_employee(row: EmployeeRow) -> Result<Employee, StoreError> {
    Employee::try_from(row).map_err(|e| {
        error!(error = %e, "Malformed employee row");
        StoreError::Unavailable(e)
    })
}

fn log_failure(context: &'static str) -> impl Fn(sqlx::Error) -> StoreError {
    move |e| {
        error!(error = %e, "{}", context);
        StoreError::from(e)
    }
}

#[async_trait]
impl EmployeeDirectory for MySqlEmployeeDirectory {
    async fn find_by_id(&self, id: u64) -> Result<Option<Employee>, StoreError> {
        let sql = format!("{} WHERE e.id = ?", SELECT_EMPLOYEE);
        sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(log_failure("Failed to fetch employee by id"))?
            .map(to_employee)
            .transpose()
    }

    async fn find_by_employee_code(&self, code: &str) -> Result<Option<Employee>, StoreError> {
        let sql = format!("{} WHERE e.employee_code = ?", SELECT_EMPLOYEE);
        sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(log_failure("Failed to fetch employee by code"))?
            .map(to_employee)
            .transpose()
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, StoreError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE role = ?")
            .bind(role.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(log_failure("Failed to count employees"))?;

        Ok(total.max(0) as u64)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<Employee>, StoreError> {
        let sql = format!("{} WHERE e.role = ? ORDER BY e.id", SELECT_EMPLOYEE);
        sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(role.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(log_failure("Failed to list employees by role"))?
            .into_iter()
            .map(to_employee)
            .collect()
    }

    async fn list_all(&self) -> Result<Vec<Employee>, StoreError> {
        let sql = format!("{} ORDER BY e.id", SELECT_EMPLOYEE);
        sqlx::query_as::<_, EmployeeRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(log_failure("Failed to list employees"))?
            .into_iter()
            .map(to_employee)
            .collect()
    }
}
