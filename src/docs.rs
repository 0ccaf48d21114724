use crate::api::attendance::{ExportQuery, HistoryQuery, SummaryQuery, TeamQuery};
use crate::attendance::aggregate::{
    AbsentEntry, DepartmentCount, MonthlySummary, PresentEntry, Roster, TodayCounts, TrendPoint,
};
use crate::attendance::reports::{EmployeeAttendance, EmployeeDashboard, TeamRecord, TeamSummary};
use crate::attendance::transition::TodayStatus;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::EmployeeRef;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracker API",
        version = "1.0.0",
        description = r#"
## Employee Attendance Tracker

Daily check-in / check-out for employees, with reports for managers.

### 🔹 Key Features
- **Self service**
  - Check in, check out, today's status, history and monthly summary
- **Team reports** (managers)
  - Filtered listings, team summary with weekly trend, today's roster
  - CSV export for a date range

### 📏 Rules
- Checking in after **09:30** marks the day **late**
- Checking out with less than **4 hours** worked marks the day **half-day**

### 🔐 Security
All endpoints require a **JWT Bearer** access token.
Team endpoints are restricted to the **manager** role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today_status,
        crate::api::attendance::my_history,
        crate::api::attendance::my_summary,

        crate::api::attendance::list_all,
        crate::api::attendance::employee_attendance,
        crate::api::attendance::team_summary,
        crate::api::attendance::today_team_status,
        crate::api::attendance::export_csv,

        crate::api::dashboard::employee_dashboard,
        crate::api::dashboard::manager_dashboard
    ),
    components(
        schemas(
            AttendanceStatus,
            AttendanceRecord,
            TodayStatus,
            MonthlySummary,
            TodayCounts,
            TrendPoint,
            DepartmentCount,
            PresentEntry,
            AbsentEntry,
            Roster,
            EmployeeRef,
            TeamRecord,
            TeamSummary,
            EmployeeAttendance,
            EmployeeDashboard,
            HistoryQuery,
            SummaryQuery,
            TeamQuery,
            ExportQuery
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Employee self-service attendance APIs"),
        (name = "Team", description = "Manager attendance reports"),
        (name = "Dashboard", description = "Dashboard aggregates"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
