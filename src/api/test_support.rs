//! Test harness: the protected API mounted over in-memory backends.

use std::sync::Arc;

use actix_web::{
    App, Error,
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    http::StatusCode,
    middleware::from_fn,
    test::{self as actix_test, TestRequest},
    web::{self, Data},
};
use chrono::NaiveDateTime;
use serde_json::Value;

use crate::attendance::testing::{FixedClock, InMemoryDirectory, InMemoryStore, employee, manager};
use crate::auth::jwt::sign_token;
use crate::auth::middleware::auth_middleware;
use crate::config::Config;
use crate::models::{Claims, TokenType};
use crate::routes::api_routes;
use crate::state::AppState;

const SECRET: &str = "test-secret";

fn config() -> Config {
    Config {
        database_url: String::new(),
        jwt_secret: SECRET.to_string(),
        server_addr: "127.0.0.1:0".to_string(),
        db_max_connections: 1,
        rate_protected_per_min: 1000,
        api_prefix: "/api".to_string(),
        log_dir: "logs".to_string(),
        log_level: tracing::Level::DEBUG,
    }
}

/// Two employees and one manager, with the clock frozen at `now`.
pub fn app_state(now: NaiveDateTime) -> Data<AppState> {
    Data::new(AppState {
        store: Arc::new(InMemoryStore::default()),
        directory: Arc::new(InMemoryDirectory::new(vec![
            employee(1, "EMP0001", Some("Engineering")),
            employee(2, "EMP0002", Some("Sales")),
            manager(10, "MGR0001"),
        ])),
        clock: Arc::new(FixedClock(now)),
    })
}

pub fn app(
    state: Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(Data::new(config()))
        .app_data(state)
        .service(
            web::scope("/api")
                .wrap(from_fn(auth_middleware))
                .configure(api_routes),
        )
}

fn token(employee_id: u64, role: u8) -> String {
    let claims = Claims {
        sub: format!("user{}", employee_id),
        employee_id,
        role,
        exp: 4_102_444_800,
        token_type: TokenType::Access,
    };
    format!("Bearer {}", sign_token(&claims, SECRET))
}

pub fn employee_token(employee_id: u64) -> String {
    token(employee_id, 1)
}

pub fn manager_token(employee_id: u64) -> String {
    token(employee_id, 2)
}

/// Runs one request and returns the status with the JSON body, or `Null`
/// when the body is not JSON.
pub async fn call(state: Data<AppState>, req: TestRequest) -> (StatusCode, Value) {
    let app = actix_test::init_service(app(state)).await;
    let resp = actix_test::call_service(&app, req.to_request()).await;
    let status = resp.status();
    let body = actix_test::read_body(resp).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}
