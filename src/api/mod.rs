use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

use crate::attendance::error::AttendanceError;

pub mod attendance;
pub mod dashboard;

#[cfg(test)]
pub mod test_support;

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::Validation(_)
            | AttendanceError::AlreadyCheckedIn
            | AttendanceError::AlreadyCheckedOut
            | AttendanceError::NoCheckIn => StatusCode::BAD_REQUEST,
            AttendanceError::NotFound(_) => StatusCode::NOT_FOUND,
            AttendanceError::Forbidden(_) => StatusCode::FORBIDDEN,
            AttendanceError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AttendanceError::StoreUnavailable(_) => {
                tracing::error!(error = %self, "Request failed");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
