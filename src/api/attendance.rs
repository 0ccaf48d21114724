use crate::{
    attendance::{
        error::AttendanceError,
        reports::{self, ExportFilter, ExportRow, TeamFilter},
        store::Page,
        transition,
    },
    auth::auth::AuthUser,
    model::attendance::{AttendanceStatus, YearMonth, parse_date},
    state::AppState,
};
use actix_web::{HttpResponse, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

/// Export column order.
pub const EXPORT_COLUMNS: [&str; 9] = [
    "date",
    "employeeCode",
    "name",
    "email",
    "department",
    "checkInTime",
    "checkOutTime",
    "status",
    "totalHours",
];

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct HistoryQuery {
    /// Restrict to one month (YYYY-MM)
    pub month: Option<String>,
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    /// Items per page
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SummaryQuery {
    /// Month to summarize (YYYY-MM); defaults to the current month
    pub month: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct TeamQuery {
    /// Filter by employee code, e.g. EMP0001
    pub employee_code: Option<String>,
    /// Filter by employee id
    pub employee_id: Option<u64>,
    /// Filter by date (YYYY-MM-DD)
    pub date: Option<String>,
    /// Filter by status (present, late, half-day, absent)
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ExportQuery {
    /// First date to include (YYYY-MM-DD)
    pub start: Option<String>,
    /// Last date to include (YYYY-MM-DD)
    pub end: Option<String>,
    /// Restrict to one employee code
    pub employee_code: Option<String>,
    /// Restrict to one employee id; wins over `employee_code`
    pub employee_id: Option<u64>,
}

fn parse_month(raw: Option<&str>) -> Result<Option<YearMonth>, AttendanceError> {
    raw.filter(|m| !m.trim().is_empty())
        .map(str::parse)
        .transpose()
}

fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, AttendanceError> {
    raw.filter(|d| !d.trim().is_empty()).map(parse_date).transpose()
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkin",
    responses(
        (status = 201, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in (late)",
            "data": {
                "employee_id": 1,
                "date": "2026-01-15",
                "check_in_time": "2026-01-15T09:45:00",
                "check_out_time": null,
                "status": "late",
                "total_hours": 0.0
            }
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<HttpResponse> {
    let now = state.clock.now();
    let record = transition::check_in(state.store.as_ref(), auth.employee_id, now).await?;

    let message = if record.status == AttendanceStatus::Late {
        "Checked in (late)"
    } else {
        "Checked in"
    };

    Ok(HttpResponse::Created().json(json!({
        "message": message,
        "data": record
    })))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkout",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out",
            "data": {
                "employee_id": 1,
                "date": "2026-01-15",
                "check_in_time": "2026-01-15T08:50:00",
                "check_out_time": "2026-01-15T11:50:00",
                "status": "half-day",
                "total_hours": 3.0
            }
        })),
        (status = 400, description = "No check-in found, or already checked out", body = Object, example = json!({
            "message": "No check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<HttpResponse> {
    let now = state.clock.now();
    let record = transition::check_out(state.store.as_ref(), auth.employee_id, now).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked out",
        "data": record
    })))
}

/// Today's status of the calling employee
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's attendance state", body = TodayStatus),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today_status(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<HttpResponse> {
    let now = state.clock.now();
    let status = transition::today_status(state.store.as_ref(), auth.employee_id, now).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// Paginated attendance history of the calling employee
#[utoipa::path(
    get,
    path = "/api/attendance/my-history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Records, newest first", body = Object, example = json!({
            "items": [],
            "total": 0,
            "page": 1,
            "limit": 50
        })),
        (status = 400, description = "Malformed month")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_history(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<HttpResponse> {
    let month = parse_month(query.month.as_deref())?;
    let page = Page::new(query.page, query.limit);

    let history = reports::history(state.store.as_ref(), auth.employee_id, month, page).await?;
    Ok(HttpResponse::Ok().json(history))
}

/// Monthly summary of the calling employee
#[utoipa::path(
    get,
    path = "/api/attendance/my-summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Per-status counts and hours", body = MonthlySummary),
        (status = 400, description = "Malformed month")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_summary(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<HttpResponse> {
    let now = state.clock.now();
    let month = parse_month(query.month.as_deref())?
        .unwrap_or_else(|| YearMonth::of(transition::today(now)));

    let summary = reports::monthly_summary(state.store.as_ref(), auth.employee_id, month).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Team attendance listing (manager)
#[utoipa::path(
    get,
    path = "/api/attendance/all",
    params(TeamQuery),
    responses(
        (status = 200, description = "Records with employee details, newest first", body = Object),
        (status = 400, description = "Malformed filter"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee EMP0404 not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Team"
)]
pub async fn list_all(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<TeamQuery>,
) -> actix_web::Result<HttpResponse> {
    auth.require_manager()?;

    let status = query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim().parse::<AttendanceStatus>().map_err(|_| {
                AttendanceError::Validation(format!("unknown status {:?}", s))
            })
        })
        .transpose()?;

    let filter = TeamFilter {
        employee_code: query.employee_code.clone().filter(|c| !c.trim().is_empty()),
        employee_id: query.employee_id,
        date: parse_optional_date(query.date.as_deref())?,
        status,
    };
    let page = Page::new(query.page, query.limit);

    let items = reports::team_query(
        state.store.as_ref(),
        state.directory.as_ref(),
        filter,
        page,
    )
    .await?;
    Ok(HttpResponse::Ok().json(items))
}

/// All attendance of one employee (manager). `id` is an employee id or code.
#[utoipa::path(
    get,
    path = "/api/attendance/employee/{id}",
    params(
        ("id" = String, Path, description = "Employee id or employee code")
    ),
    responses(
        (status = 200, description = "Employee and records", body = EmployeeAttendance),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Team"
)]
pub async fn employee_attendance(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> actix_web::Result<HttpResponse> {
    auth.require_manager()?;

    let identifier = path.into_inner();
    let attendance = reports::employee_attendance(
        state.store.as_ref(),
        state.directory.as_ref(),
        &identifier,
    )
    .await?;
    Ok(HttpResponse::Ok().json(attendance))
}

/// Team summary: today's counts, weekly trend, department split (manager)
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    responses(
        (status = 200, description = "Team summary", body = TeamSummary),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Team"
)]
pub async fn team_summary(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<HttpResponse> {
    auth.require_manager()?;

    let now = state.clock.now();
    let summary =
        reports::team_summary(state.store.as_ref(), state.directory.as_ref(), now).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Who is in today and who is not (manager)
#[utoipa::path(
    get,
    path = "/api/attendance/today-status",
    responses(
        (status = 200, description = "Present and absent lists", body = Roster),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Team"
)]
pub async fn today_team_status(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<HttpResponse> {
    auth.require_manager()?;

    let now = state.clock.now();
    let roster =
        reports::today_roster(state.store.as_ref(), state.directory.as_ref(), now).await?;
    Ok(HttpResponse::Ok().json(roster))
}

/// CSV export of a date range (manager)
#[utoipa::path(
    get,
    path = "/api/attendance/export",
    params(ExportQuery),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 400, description = "Malformed date"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found for export")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Team"
)]
pub async fn export_csv(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<ExportQuery>,
) -> actix_web::Result<HttpResponse> {
    auth.require_manager()?;

    let filter = ExportFilter {
        start: parse_optional_date(query.start.as_deref())?,
        end: parse_optional_date(query.end.as_deref())?,
        employee_code: query.employee_code.clone().filter(|c| !c.trim().is_empty()),
        employee_id: query.employee_id,
    };

    let rows = reports::export_range(state.store.as_ref(), state.directory.as_ref(), filter).await?;
    let csv = render_csv(&rows).map_err(|e| {
        error!(error = %e, "Failed to render CSV export");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let filename = format!(
        "attendance_export_{}.csv",
        state.clock.now().and_utc().timestamp_millis()
    );
    info!(rows = rows.len(), %filename, "Attendance exported");

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(csv))
}

/// Header line plus one line per row, even when there are no rows.
pub fn render_csv(rows: &[ExportRow]) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(EXPORT_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{app, app_state, call, employee_token, manager_token};
    use crate::attendance::testing::{at, day};
    use actix_web::http::StatusCode;
    use actix_web::test::{TestRequest, call_service, init_service, read_body};

    #[test]
    fn csv_has_header_even_without_rows() {
        let csv = render_csv(&[]).unwrap();
        assert_eq!(
            csv,
            "date,employeeCode,name,email,department,checkInTime,checkOutTime,status,totalHours\n"
        );
    }

    #[test]
    fn csv_quotes_fields_that_need_it() {
        let row = ExportRow {
            date: "2026-03-02".into(),
            employee_code: "EMP0001".into(),
            name: "Doe, John".into(),
            email: "john@company.com".into(),
            department: String::new(),
            check_in_time: "2026-03-02T09:00:00.000".into(),
            check_out_time: String::new(),
            status: "present".into(),
            total_hours: "0.00".into(),
        };
        let csv = render_csv(&[row]).unwrap();
        let line = csv.lines().nth(1).unwrap();
        assert_eq!(
            line,
            "2026-03-02,EMP0001,\"Doe, John\",john@company.com,,2026-03-02T09:00:00.000,,present,0.00"
        );
    }

    #[actix_web::test]
    async fn missing_token_is_unauthorized() {
        let state = app_state(at(day(2026, 3, 2), 9, 0));
        let req = TestRequest::post().uri("/api/attendance/checkin");
        let (status, _) = call(state, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn check_in_twice_is_a_bad_request() {
        let state = app_state(at(day(2026, 3, 2), 9, 45));

        let req = TestRequest::post()
            .uri("/api/attendance/checkin")
            .insert_header(("Authorization", employee_token(1)));
        let (status, body) = call(state.clone(), req).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Checked in (late)");
        assert_eq!(body["data"]["status"], "late");
        assert_eq!(body["data"]["date"], "2026-03-02");

        let req = TestRequest::post()
            .uri("/api/attendance/checkin")
            .insert_header(("Authorization", employee_token(1)));
        let (status, body) = call(state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Already checked in for today");
    }

    #[actix_web::test]
    async fn check_out_without_check_in_is_a_bad_request() {
        let state = app_state(at(day(2026, 3, 2), 17, 0));
        let req = TestRequest::post()
            .uri("/api/attendance/checkout")
            .insert_header(("Authorization", employee_token(1)));
        let (status, body) = call(state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No check-in found for today");
    }

    #[actix_web::test]
    async fn today_reports_not_checked_in() {
        let state = app_state(at(day(2026, 3, 2), 9, 0));
        let req = TestRequest::get()
            .uri("/api/attendance/today")
            .insert_header(("Authorization", employee_token(1)));
        let (status, body) = call(state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "not_checked_in");
        assert_eq!(body["total_hours"], 0.0);
    }

    #[actix_web::test]
    async fn malformed_month_is_rejected() {
        let state = app_state(at(day(2026, 3, 2), 9, 0));
        let req = TestRequest::get()
            .uri("/api/attendance/my-summary?month=2026-13")
            .insert_header(("Authorization", employee_token(1)));
        let (status, _) = call(state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn summary_defaults_to_current_month() {
        let state = app_state(at(day(2026, 3, 2), 9, 0));
        let req = TestRequest::get()
            .uri("/api/attendance/my-summary")
            .insert_header(("Authorization", employee_token(1)));
        let (status, body) = call(state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["month"], "2026-03");
        assert_eq!(body["total_days_recorded"], 0);
    }

    #[actix_web::test]
    async fn team_routes_require_manager() {
        let state = app_state(at(day(2026, 3, 2), 9, 0));
        for uri in [
            "/api/attendance/all",
            "/api/attendance/summary",
            "/api/attendance/export",
            "/api/attendance/today-status",
            "/api/attendance/employee/EMP0001",
        ] {
            let req = TestRequest::get()
                .uri(uri)
                .insert_header(("Authorization", employee_token(1)));
            let (status, body) = call(state.clone(), req).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
            assert_eq!(body["message"], "Manager only");
        }
    }

    #[actix_web::test]
    async fn unknown_employee_code_filter_is_not_found() {
        let state = app_state(at(day(2026, 3, 2), 9, 0));
        let req = TestRequest::get()
            .uri("/api/attendance/all?employee_code=EMP0404")
            .insert_header(("Authorization", manager_token(10)));
        let (status, body) = call(state, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Employee EMP0404 not found");
    }

    #[actix_web::test]
    async fn export_returns_csv_attachment() {
        let state = app_state(at(day(2026, 3, 2), 9, 10));
        let req = TestRequest::post()
            .uri("/api/attendance/checkin")
            .insert_header(("Authorization", employee_token(1)));
        call(state.clone(), req).await;

        let app = init_service(app(state)).await;
        let req = TestRequest::get()
            .uri("/api/attendance/export?start=2026-03-01&end=2026-03-31")
            .insert_header(("Authorization", manager_token(10)))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("content-type").unwrap(), "text/csv");
        let disposition = resp.headers().get("content-disposition").unwrap().to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"attendance_export_"));

        let body = read_body(resp).await;
        let text = std::str::from_utf8(&body).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("2026-03-02,EMP0001,Employee 1,"));
        assert!(lines[1].ends_with(",present,0.00"));
    }

    #[actix_web::test]
    async fn export_filters_by_employee_id() {
        let state = app_state(at(day(2026, 3, 2), 9, 10));
        for id in [1, 2] {
            let req = TestRequest::post()
                .uri("/api/attendance/checkin")
                .insert_header(("Authorization", employee_token(id)));
            call(state.clone(), req).await;
        }

        let app = init_service(app(state)).await;
        let req = TestRequest::get()
            .uri("/api/attendance/export?employee_code=EMP0001&employee_id=2")
            .insert_header(("Authorization", manager_token(10)))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = read_body(resp).await;
        let text = std::str::from_utf8(&body).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("2026-03-02,EMP0002,"));
    }

    #[actix_web::test]
    async fn team_summary_counts_roster_without_managers() {
        let state = app_state(at(day(2026, 3, 2), 9, 10));
        let req = TestRequest::post()
            .uri("/api/attendance/checkin")
            .insert_header(("Authorization", employee_token(1)));
        call(state.clone(), req).await;

        let req = TestRequest::get()
            .uri("/api/attendance/summary")
            .insert_header(("Authorization", manager_token(10)));
        let (status, body) = call(state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_employees"], 2);
        assert_eq!(body["todays"]["present"], 1);
        assert_eq!(body["todays"]["absent"], 1);
        assert_eq!(body["weekly_trend"].as_array().unwrap().len(), 7);
    }
}
