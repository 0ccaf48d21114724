use crate::{attendance::reports, auth::auth::AuthUser, state::AppState};
use actix_web::{HttpResponse, web};

/// Dashboard of the calling employee: today's record and this month's summary
#[utoipa::path(
    get,
    path = "/api/dashboard/employee",
    responses(
        (status = 200, description = "Employee dashboard", body = EmployeeDashboard),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn employee_dashboard(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<HttpResponse> {
    let now = state.clock.now();
    let dashboard = reports::employee_dashboard(state.store.as_ref(), auth.employee_id, now).await?;
    Ok(HttpResponse::Ok().json(dashboard))
}

/// Manager dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard/manager",
    responses(
        (status = 200, description = "Team summary", body = TeamSummary),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn manager_dashboard(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<HttpResponse> {
    auth.require_manager()?;

    let now = state.clock.now();
    let summary =
        reports::team_summary(state.store.as_ref(), state.directory.as_ref(), now).await?;
    Ok(HttpResponse::Ok().json(summary))
}
