use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Failures of the timeline endpoints.
#[derive(Debug, Display)]
pub enum TimelineError {
    #[display(fmt = "Invalid date `{}` for `{}`, expected YYYY-MM-DD", value, field)]
    InvalidDate { field: &'static str, value: String },
    #[display(fmt = "Unknown status filter `{}`. Allowed: all, late, onTime, halfDay", _0)]
    UnknownStatus(String),
    #[display(fmt = "Range covers {} days, at most {} allowed", days, max)]
    RangeTooWide { days: i64, max: i64 },
    #[display(fmt = "Too many users ({}), at most {} allowed", count, max)]
    TooManyUsers { count: usize, max: usize },
    /// Attendance, holiday or leave data could not be loaded.
    #[display(fmt = "Failed to load attendance data")]
    Upstream,
}

impl ResponseError for TimelineError {
    fn status_code(&self) -> StatusCode {
        match self {
            TimelineError::InvalidDate { .. }
            | TimelineError::UnknownStatus(_)
            | TimelineError::RangeTooWide { .. }
            | TimelineError::TooManyUsers { .. } => StatusCode::BAD_REQUEST,
            TimelineError::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_input_is_a_client_error() {
        let err = TimelineError::UnknownStatus("early".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("early"));
        assert_eq!(TimelineError::Upstream.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let wide = TimelineError::RangeTooWide { days: 400, max: 366 };
        assert_eq!(wide.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(wide.to_string(), "Range covers 400 days, at most 366 allowed");
    }
}
