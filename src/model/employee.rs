use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

/// Employee as seen by the attendance core. Owned by the employee directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP0001",
        "name": "John Doe",
        "email": "john.doe@company.com",
        "department": "Engineering",
        "role": "employee"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP0001")]
    pub employee_code: String,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "Engineering", nullable = true)]
    pub department: Option<String>,

    pub role: Role,
}

#[derive(Debug, sqlx::FromRow)]
pub struct EmployeeRow {
    pub id: u64,
    pub employee_code: String,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub role: String,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = String;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role)
            .map_err(|_| format!("invalid role {:?} for employee {}", row.role, row.id))?;

        Ok(Employee {
            id: row.id,
            employee_code: row.employee_code,
            name: row.name,
            email: row.email,
            // blank department names are treated as unassigned
            department: row.department.filter(|d| !d.trim().is_empty()),
            role,
        })
    }
}

/// The subset of employee fields attached to attendance listings.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeRef {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub employee_code: String,
    pub department: Option<String>,
}

impl From<&Employee> for EmployeeRef {
    fn from(e: &Employee) -> Self {
        EmployeeRef {
            id: e.id,
            name: e.name.clone(),
            email: e.email.clone(),
            employee_code: e.employee_code.clone(),
            department: e.department.clone(),
        }
    }
}
