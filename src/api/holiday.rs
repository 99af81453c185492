use crate::auth::auth::AuthUser;
use crate::utils::datetime::parse_date;
use crate::utils::holiday_cache;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct HolidayQuery {
    #[schema(example = "2024-01-01")]
    /// First day, defaults to January 1st of the current year
    pub from: Option<String>,
    #[schema(example = "2024-12-31")]
    /// Last day, defaults to December 31st of the current year
    pub to: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateHoliday {
    #[schema(example = "2024-06-17", format = "date", value_type = String)]
    pub holiday_date: NaiveDate,
    #[schema(example = "Eid al-Adha")]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_optional: bool,
}

fn window(query: &HolidayQuery) -> actix_web::Result<(NaiveDate, NaiveDate)> {
    let year = Local::now().year();
    let bound = |value: &Option<String>, month: u32, day: u32| -> actix_web::Result<NaiveDate> {
        match value.as_deref().filter(|v| !v.trim().is_empty()) {
            Some(v) => parse_date(v).ok_or_else(|| {
                actix_web::error::ErrorBadRequest(format!("Invalid date `{}`, expected YYYY-MM-DD", v))
            }),
            None => NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| actix_web::error::ErrorInternalServerError("Invalid calendar")),
        }
    };
    Ok((bound(&query.from, 1, 1)?, bound(&query.to, 12, 31)?))
}

/// List holidays
#[utoipa::path(
    get,
    path = "/api/holiday",
    params(HolidayQuery),
    responses(
        (status = 200, description = "Holidays in the window", body = [HolidayRecord]),
        (status = 400, description = "Bad date"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn list_holidays(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<HolidayQuery>,
) -> actix_web::Result<impl Responder> {
    let (from, to) = window(&query)?;

    let holidays = holiday_cache::holidays_between(pool.get_ref(), from, to)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch holidays");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(holidays.as_slice()))
}

/// Add a holiday (HR/Admin)
#[utoipa::path(
    post,
    path = "/api/holiday",
    request_body(
        content = CreateHoliday,
        description = "Holiday payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Holiday created", body = Object, example = json!({
            "message": "Holiday created"
        })),
        (status = 400, description = "A holiday already exists on that date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn create_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateHoliday>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if payload.title.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "title must not be empty"
        })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO holidays (holiday_date, title, description, is_optional)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(payload.holiday_date)
    .bind(payload.title.trim())
    .bind(&payload.description)
    .bind(payload.is_optional)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            holiday_cache::invalidate();
            tracing::info!(date = %payload.holiday_date, by = %auth.username, "Holiday created");
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "message": "Holiday created"
            })))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                        "message": "A holiday already exists on that date"
                    })));
                }
            }

            tracing::error!(error = %e, "Failed to create holiday");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}
