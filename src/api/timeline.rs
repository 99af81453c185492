use crate::api::error::TimelineError;
use crate::auth::auth::AuthUser;
use crate::db;
use crate::model::attendance::{AttendanceRecord, RawAttendanceRecord};
use crate::model::holiday::{HolidayRecord, RawHolidayRecord};
use crate::model::ingest_all;
use crate::model::leave_request::{LeaveRecord, RawLeaveRecord};
use crate::timekeeping::export::to_csv;
use crate::timekeeping::filter::{StatusFilter, TimelineQuery, UserSelection};
use crate::timekeeping::rules::AttendanceRules;
use crate::timekeeping::timeline::Sources;
use crate::timekeeping::{TimelineReport, build_report};
use crate::utils::datetime::parse_date;
use crate::utils::holiday_cache;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;
use sqlx::MySqlPool;
use std::str::FromStr;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

/// Query dates outside these years are refused.
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 9999;

/// Most employees a single compute request may name.
const MAX_COMPUTE_USERS: usize = 1000;

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct TimelineParams {
    #[schema(example = "2024-06-01")]
    /// First day, inclusive (YYYY-MM-DD)
    pub from: Option<String>,
    #[schema(example = "2024-06-30")]
    /// Last day, inclusive (YYYY-MM-DD), defaults to today
    pub to: Option<String>,
    #[schema(example = "late")]
    /// all | late | onTime | halfDay
    pub status: Option<String>,
    #[schema(example = "all")]
    /// Username or `all`; employees always get their own
    pub user: Option<String>,
}

impl TimelineParams {
    pub fn into_query(self) -> Result<TimelineQuery, TimelineError> {
        let date = |field: &'static str, value: Option<String>| -> Result<Option<NaiveDate>, TimelineError> {
            match value.filter(|v| !v.trim().is_empty()) {
                None => Ok(None),
                Some(v) => parse_date(&v)
                    .filter(|d| (MIN_YEAR..=MAX_YEAR).contains(&d.year()))
                    .map(Some)
                    .ok_or(TimelineError::InvalidDate { field, value: v }),
            }
        };

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => StatusFilter::All,
            Some(s) => StatusFilter::from_str(s).map_err(|_| TimelineError::UnknownStatus(s.to_string()))?,
        };

        Ok(TimelineQuery {
            from: date("from", self.from)?,
            to: date("to", self.to)?,
            status,
            user: UserSelection::parse(self.user.as_deref()),
        })
    }
}

/// Refuse explicit ranges wider than the rules allow. Inverted ranges
/// pass and come back empty.
fn check_span(query: &TimelineQuery, today: NaiveDate, rules: &AttendanceRules) -> Result<(), TimelineError> {
    let Some(from) = query.from else {
        return Ok(());
    };
    let days = query.to.unwrap_or(today).signed_duration_since(from).num_days() + 1;
    if days > rules.max_range_days {
        return Err(TimelineError::RangeTooWide {
            days,
            max: rules.max_range_days,
        });
    }
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

struct Loaded {
    records: Vec<AttendanceRecord>,
    holidays: Vec<HolidayRecord>,
    leaves: Vec<LeaveRecord>,
    roster: Vec<String>,
}

async fn load(
    pool: &MySqlPool,
    query: &TimelineQuery,
    today: NaiveDate,
    rules: &AttendanceRules,
) -> Result<Loaded, TimelineError> {
    let to = query.to.unwrap_or(today);
    let from = query.from.unwrap_or_else(|| rules.earliest_start(to));
    let username = match &query.user {
        UserSelection::User(name) => Some(name.as_str()),
        UserSelection::All => None,
    };

    let records = db::fetch_attendance(pool, username, from, to)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch attendance");
            TimelineError::Upstream
        })?;

    let holidays = holiday_cache::holidays_between(pool, from, to)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch holidays");
            TimelineError::Upstream
        })?;

    let leave_rows = db::fetch_approved_leaves(pool, username, from, to)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch leave");
            TimelineError::Upstream
        })?;

    let roster = match username {
        Some(_) => Vec::new(),
        None => db::fetch_active_usernames(pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch roster");
            TimelineError::Upstream
        })?,
    };

    Ok(Loaded {
        records,
        holidays: (*holidays).clone(),
        leaves: ingest_all(leave_rows, "leave"),
        roster,
    })
}

async fn report_for(
    auth: &AuthUser,
    pool: &MySqlPool,
    rules: &AttendanceRules,
    params: TimelineParams,
) -> actix_web::Result<TimelineReport> {
    let mut query = params.into_query()?;
    query.user = auth.visible_selection(query.user)?;

    let today = today();
    check_span(&query, today, rules)?;
    let loaded = load(pool, &query, today, rules).await?;
    let report = build_report(
        &query,
        &loaded.roster,
        today,
        Sources {
            records: &loaded.records,
            holidays: &loaded.holidays,
            leaves: &loaded.leaves,
        },
        rules,
    );

    tracing::debug!(rows = report.rows.len(), "Timeline built");
    Ok(report)
}

/// Attendance timeline with its summary
#[utoipa::path(
    get,
    path = "/api/attendance/timeline",
    params(TimelineParams),
    responses(
        (status = 200, description = "Timeline rows, newest first, and summary", body = TimelineReport),
        (status = 400, description = "Bad filter value", body = Object, example = json!({
            "message": "Unknown status filter `early`. Allowed: all, late, onTime, halfDay"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_timeline", skip_all, fields(username = %auth.username))]
pub async fn get_timeline(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    rules: web::Data<AttendanceRules>,
    params: web::Query<TimelineParams>,
) -> actix_web::Result<impl Responder> {
    let report = report_for(&auth, pool.get_ref(), rules.get_ref(), params.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Summary counts only
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    params(TimelineParams),
    responses(
        (status = 200, description = "Day counts per category", body = Summary),
        (status = 400, description = "Bad filter value"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_summary", skip_all, fields(username = %auth.username))]
pub async fn get_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    rules: web::Data<AttendanceRules>,
    params: web::Query<TimelineParams>,
) -> actix_web::Result<impl Responder> {
    let report = report_for(&auth, pool.get_ref(), rules.get_ref(), params.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report.summary))
}

/// Timeline as a CSV download
#[utoipa::path(
    get,
    path = "/api/attendance/export",
    params(TimelineParams),
    responses(
        (status = 200, description = "CSV file", body = String, content_type = "text/csv"),
        (status = 400, description = "Bad filter value"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_export", skip_all, fields(username = %auth.username))]
pub async fn export_timeline(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    rules: web::Data<AttendanceRules>,
    params: web::Query<TimelineParams>,
) -> actix_web::Result<impl Responder> {
    let report = report_for(&auth, pool.get_ref(), rules.get_ref(), params.into_inner()).await?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename("attendance.csv".to_string())],
        })
        .body(to_csv(&report.rows)))
}

/// Stateless computation over arrays supplied by the caller.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ComputeRequest {
    #[serde(default)]
    pub attendance: Vec<RawAttendanceRecord>,
    #[serde(default)]
    pub holidays: Vec<RawHolidayRecord>,
    #[serde(default)]
    pub leaves: Vec<RawLeaveRecord>,
    /// Employees to include in the all-users view even without any rows.
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub query: TimelineParams,
    /// Reference day for range defaults, normally today.
    #[schema(example = "2024-06-30", format = "date", value_type = Option<String>)]
    pub today: Option<NaiveDate>,
}

/// Build a timeline from supplied records
#[utoipa::path(
    post,
    path = "/api/attendance/timeline/compute",
    request_body(
        content = ComputeRequest,
        description = "Raw attendance, holiday and leave records plus filters",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Timeline rows and summary", body = TimelineReport),
        (status = 400, description = "Bad filter value"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_compute", skip_all, fields(username = %auth.username))]
pub async fn compute_timeline(
    auth: AuthUser,
    rules: web::Data<AttendanceRules>,
    payload: web::Json<ComputeRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let payload = payload.into_inner();
    let query = payload.query.into_query()?;
    let today = payload.today.unwrap_or_else(today);
    check_span(&query, today, rules.get_ref())?;
    if payload.users.len() > MAX_COMPUTE_USERS {
        return Err(TimelineError::TooManyUsers {
            count: payload.users.len(),
            max: MAX_COMPUTE_USERS,
        }
        .into());
    }

    let records: Vec<AttendanceRecord> = ingest_all(payload.attendance, "attendance");
    let holidays: Vec<HolidayRecord> = ingest_all(payload.holidays, "holiday");
    let leaves: Vec<LeaveRecord> = ingest_all(payload.leaves, "leave");

    let report = build_report(
        &query,
        &payload.users,
        today,
        Sources {
            records: &records,
            holidays: &holidays,
            leaves: &leaves,
        },
        rules.get_ref(),
    );
    Ok(HttpResponse::Ok().json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::tests::token;
    use crate::config::Config;
    use crate::models::TokenType;
    use actix_web::{App, http::StatusCode, test as actix_test};
    use serde_json::{Value, json};

    const SECRET: &str = "test-secret";

    fn config() -> Config {
        Config {
            database_url: String::new(),
            jwt_secret: SECRET.to_string(),
            server_addr: String::new(),
            rate_protected_per_min: 1000,
            api_prefix: "/api".to_string(),
            holiday_cache_ttl_secs: 60,
            rules: AttendanceRules::default(),
        }
    }

    macro_rules! app {
        () => {
            actix_test::init_service(
                App::new()
                    .app_data(web::Data::new(config()))
                    .app_data(web::Data::new(AttendanceRules::default()))
                    .route("/compute", web::post().to(compute_timeline)),
            )
            .await
        };
    }

    fn body() -> Value {
        json!({
            "attendance": [
                {
                    "date": "2024-06-12",
                    "username": "asha",
                    "checkin_time": "2024-06-12 09:50:00",
                    "checkout_time": "2024-06-12 18:30:00"
                },
                { "date": "not a date", "username": "asha" }
            ],
            "holidays": [{ "holiday_date": "2024-06-11", "title": "Founders day" }],
            "leaves": [{
                "username": "asha",
                "from_date": "2024-06-10",
                "to_date": "2024-06-11",
                "leave_type": "sick"
            }],
            "query": { "from": "2024-06-09", "to": "2024-06-13", "user": "asha" },
            "today": "2024-06-30"
        })
    }

    #[test]
    fn params_parse() {
        let query = TimelineParams {
            from: Some("2024-06-01".into()),
            to: None,
            status: Some("onTime".into()),
            user: Some("asha".into()),
        }
        .into_query()
        .unwrap();
        assert_eq!(query.from, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(query.status, StatusFilter::OnTime);
        assert_eq!(query.user, UserSelection::User("asha".into()));
    }

    #[test]
    fn params_reject_bad_values() {
        let bad_status = TimelineParams {
            status: Some("early".into()),
            ..Default::default()
        };
        assert!(matches!(bad_status.into_query(), Err(TimelineError::UnknownStatus(_))));

        let bad_date = TimelineParams {
            to: Some("31/06/2024".into()),
            ..Default::default()
        };
        assert!(matches!(
            bad_date.into_query(),
            Err(TimelineError::InvalidDate { field: "to", .. })
        ));
    }

    #[test]
    fn params_reject_out_of_range_years() {
        for to in ["-262143-01-05", "1899-12-31"] {
            let params = TimelineParams {
                to: Some(to.into()),
                ..Default::default()
            };
            assert!(matches!(
                params.into_query(),
                Err(TimelineError::InvalidDate { field: "to", .. })
            ));
        }
    }

    #[test]
    fn span_is_capped() {
        let rules = AttendanceRules::default();
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let query = |from: &str, to: Option<&str>| {
            TimelineParams {
                from: Some(from.into()),
                to: to.map(Into::into),
                ..Default::default()
            }
            .into_query()
            .unwrap()
        };

        assert!(matches!(
            check_span(&query("1900-01-01", Some("2100-12-31")), today, &rules),
            Err(TimelineError::RangeTooWide { max: 366, .. })
        ));
        // leap year, exactly 366 days
        assert!(check_span(&query("2024-01-01", Some("2024-12-31")), today, &rules).is_ok());
        assert!(check_span(&query("2024-06-13", Some("2024-06-09")), today, &rules).is_ok());
        // open end defaults to today
        assert!(check_span(&query("2023-06-30", None), today, &rules).is_err());
        assert!(check_span(&TimelineQuery::default(), today, &rules).is_ok());
    }

    async fn post_as_hr(payload: Value) -> (StatusCode, Value) {
        let app = app!();
        let req = actix_test::TestRequest::post()
            .uri("/compute")
            .insert_header(("Authorization", format!("Bearer {}", token("hr", 2, TokenType::Access, SECRET))))
            .set_json(payload)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        let status = resp.status();
        let body = actix_test::read_body(resp).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[actix_web::test]
    async fn compute_with_inverted_range_is_empty() {
        let mut payload = body();
        payload["query"]["from"] = json!("2024-06-13");
        payload["query"]["to"] = json!("2024-06-09");

        let (status, report) = post_as_hr(payload).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["rows"], json!([]));
        assert_eq!(report["summary"]["absents"], 0);
    }

    #[actix_web::test]
    async fn compute_rejects_wide_range() {
        let mut payload = body();
        payload["query"]["from"] = json!("1900-01-01");
        payload["query"]["to"] = json!("2100-12-31");

        let (status, error) = post_as_hr(payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["message"], "Range covers 73414 days, at most 366 allowed");
    }

    #[actix_web::test]
    async fn compute_rejects_extreme_date() {
        let mut payload = body();
        payload["query"] = json!({ "to": "-262143-01-05" });

        let (status, _) = post_as_hr(payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn compute_rejects_oversized_roster() {
        let mut payload = body();
        payload["users"] = json!((0..=MAX_COMPUTE_USERS).map(|i| format!("user{i}")).collect::<Vec<_>>());

        let (status, _) = post_as_hr(payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn compute_builds_report() {
        let app = app!();
        let req = actix_test::TestRequest::post()
            .uri("/compute")
            .insert_header(("Authorization", format!("Bearer {}", token("hr", 2, TokenType::Access, SECRET))))
            .set_json(body())
            .to_request();

        let resp: Value = actix_test::call_and_read_body_json(&app, req).await;
        let types: Vec<&str> = resp["rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["type"].as_str().unwrap())
            .collect();

        // 13 Thu .. 9 Sun
        assert_eq!(types, vec!["absent", "present", "holiday", "leave", "sunday"]);
        assert_eq!(resp["rows"][1]["checkin_status"], "late");
        assert_eq!(resp["rows"][1]["checkout_status"], "onTime");
        assert_eq!(
            resp["summary"],
            json!({
                "present": 1, "absents": 1, "leaves": 1, "holidays": 1,
                "sundays": 1, "halfDays": 0, "lateDays": 1
            })
        );
    }

    #[actix_web::test]
    async fn compute_requires_hr() {
        let app = app!();
        let req = actix_test::TestRequest::post()
            .uri("/compute")
            .insert_header(("Authorization", format!("Bearer {}", token("asha", 3, TokenType::Access, SECRET))))
            .set_json(body())
            .to_request();

        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn compute_requires_token() {
        let app = app!();
        let req = actix_test::TestRequest::post().uri("/compute").set_json(body()).to_request();

        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn compute_rejects_unknown_filter() {
        let app = app!();
        let mut payload = body();
        payload["query"]["status"] = json!("early");
        let req = actix_test::TestRequest::post()
            .uri("/compute")
            .insert_header(("Authorization", format!("Bearer {}", token("hr", 2, TokenType::Access, SECRET))))
            .set_json(payload)
            .to_request();

        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
