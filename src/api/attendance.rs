use crate::auth::auth::AuthUser;
use crate::timekeeping::rules::BreakKind;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PunchRequest {
    #[schema(example = "Plot 12, Gulshan Avenue, Dhaka")]
    /// Where the punch was made, as reported by the device
    pub address: Option<String>,
}

fn punch_failed(e: sqlx::Error, username: &str, action: &str) -> actix_web::Error {
    tracing::error!(error = %e, username, action, "Punch failed");
    actix_web::error::ErrorInternalServerError("Internal Server Error")
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body(content = PunchRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
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
    pool: web::Data<MySqlPool>,
    payload: Option<web::Json<PunchRequest>>,
) -> actix_web::Result<impl Responder> {
    let address = payload.and_then(|p| p.into_inner().address);

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (username, date, checkin_time, checkin_address)
        VALUES (?, CURDATE(), NOW(), ?)
        "#,
    )
    .bind(&auth.username)
    .bind(address)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Checked in successfully"
        }))),

        Err(e) => {
            // Duplicate check-in for same day
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                        "message": "Already checked in today"
                    })));
                }
            }

            Err(punch_failed(e, &auth.username, "check-in"))
        }
    }
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/attendance",
    request_body(content = PunchRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully"
        })),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "message": "No active check-in found for today"
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
    pool: web::Data<MySqlPool>,
    payload: Option<web::Json<PunchRequest>>,
) -> actix_web::Result<impl Responder> {
    let address = payload.and_then(|p| p.into_inner().address);

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET checkout_time = NOW(), checkout_address = ?
        WHERE username = ?
        AND date = CURDATE()
        AND checkout_time IS NULL
        "#,
    )
    .bind(address)
    .bind(&auth.username)
    .execute(pool.get_ref())
    .await
    .map_err(|e| punch_failed(e, &auth.username, "check-out"))?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "No active check-in found for today"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked out successfully"
    })))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakEdge {
    Start,
    End,
}

/// UPDATE for one break edge. Column names come from the enums only.
fn break_sql(kind: BreakKind, edge: BreakEdge) -> String {
    let start = format!("break_{}_start", kind);
    let end = format!("break_{}_end", kind);
    match edge {
        BreakEdge::Start => format!(
            "UPDATE attendance SET {start} = NOW() \
             WHERE username = ? AND date = CURDATE() \
             AND checkout_time IS NULL AND {start} IS NULL"
        ),
        BreakEdge::End => format!(
            "UPDATE attendance SET {end} = NOW() \
             WHERE username = ? AND date = CURDATE() \
             AND {start} IS NOT NULL AND {end} IS NULL"
        ),
    }
}

async fn punch_break(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    kind: String,
    edge: BreakEdge,
) -> actix_web::Result<HttpResponse> {
    let kind = BreakKind::from_str(&kind).map_err(|_| {
        actix_web::error::ErrorBadRequest("Unknown break. Allowed: morning, lunch, evening")
    })?;

    let result = sqlx::query(&break_sql(kind, edge))
        .bind(&auth.username)
        .execute(pool.get_ref())
        .await
        .map_err(|e| punch_failed(e, &auth.username, "break"))?;

    if result.rows_affected() == 0 {
        let message = match edge {
            BreakEdge::Start => format!("Cannot start {} break now", kind),
            BreakEdge::End => format!("No open {} break found for today", kind),
        };
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({ "message": message })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": match edge {
            BreakEdge::Start => format!("{} break started", kind),
            BreakEdge::End => format!("{} break ended", kind),
        }
    })))
}

/// Start a break
#[utoipa::path(
    put,
    path = "/api/attendance/break/{kind}/start",
    params(
        ("kind" = String, Path, description = "morning, lunch or evening")
    ),
    responses(
        (status = 200, description = "Break started", body = Object, example = json!({
            "message": "lunch break started"
        })),
        (status = 400, description = "Unknown break, not checked in, or already started"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn start_break(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    punch_break(auth, pool, path.into_inner(), BreakEdge::Start).await
}

/// End a break
#[utoipa::path(
    put,
    path = "/api/attendance/break/{kind}/end",
    params(
        ("kind" = String, Path, description = "morning, lunch or evening")
    ),
    responses(
        (status = 200, description = "Break ended", body = Object, example = json!({
            "message": "lunch break ended"
        })),
        (status = 400, description = "Unknown break or no open break"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn end_break(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    punch_break(auth, pool, path.into_inner(), BreakEdge::End).await
}
