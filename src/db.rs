use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::model::attendance::AttendanceRecord;
use crate::model::holiday::HolidayRecord;
use crate::model::leave_request::LeaveRequest;

pub async fn init_db(database_url: &str) -> MySqlPool {
    MySqlPool::connect(database_url)
        .await
        .expect("Failed to connect to database")
}

/// Punch rows in `from..=to`, for one user or everyone.
pub async fn fetch_attendance(
    pool: &MySqlPool,
    username: Option<&str>,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let mut sql = String::from(
        r#"
        SELECT date, username, checkin_time, checkout_time,
               break_morning_start, break_morning_end,
               break_lunch_start, break_lunch_end,
               break_evening_start, break_evening_end,
               checkin_address, checkout_address
        FROM attendance
        WHERE date BETWEEN ? AND ?
        "#,
    );
    if username.is_some() {
        sql.push_str(" AND username = ?");
    }
    sql.push_str(" ORDER BY date DESC");

    let mut query = sqlx::query_as::<_, AttendanceRecord>(&sql).bind(from).bind(to);
    if let Some(name) = username {
        query = query.bind(name);
    }
    query.fetch_all(pool).await
}

pub async fn fetch_holidays(
    pool: &MySqlPool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<HolidayRecord>, sqlx::Error> {
    sqlx::query_as::<_, HolidayRecord>(
        r#"
        SELECT holiday_date, title, description, is_optional
        FROM holidays
        WHERE holiday_date BETWEEN ? AND ?
        ORDER BY holiday_date
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
}

/// Approved leave overlapping `from..=to`.
pub async fn fetch_approved_leaves(
    pool: &MySqlPool,
    username: Option<&str>,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<LeaveRequest>, sqlx::Error> {
    let mut sql = String::from(
        r#"
        SELECT id, username, from_date, to_date, leave_type, reason, status
        FROM leave_requests
        WHERE status = 'approved'
        AND to_date >= ?
        AND from_date <= ?
        "#,
    );
    if username.is_some() {
        sql.push_str(" AND username = ?");
    }

    let mut query = sqlx::query_as::<_, LeaveRequest>(&sql).bind(from).bind(to);
    if let Some(name) = username {
        query = query.bind(name);
    }
    query.fetch_all(pool).await
}

/// Active employees, used as the roster of the all-users view.
pub async fn fetch_active_usernames(pool: &MySqlPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT username FROM users WHERE is_active = 1 ORDER BY username",
    )
    .fetch_all(pool)
    .await
}
