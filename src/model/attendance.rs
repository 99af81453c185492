use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{IngestError, required, required_date};
use crate::timekeeping::rules::BreakKind;
use crate::utils::datetime::parse_timestamp;

/// One employee's punches for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = "2024-06-12", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "asha")]
    pub username: String,
    #[schema(example = "2024-06-12T09:50:00", format = "date-time", value_type = Option<String>)]
    pub checkin_time: Option<NaiveDateTime>,
    #[schema(example = "2024-06-12T18:30:00", format = "date-time", value_type = Option<String>)]
    pub checkout_time: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub break_morning_start: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub break_morning_end: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub break_lunch_start: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub break_lunch_end: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub break_evening_start: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub break_evening_end: Option<NaiveDateTime>,
    #[schema(example = "Plot 12, Gulshan Avenue")]
    pub checkin_address: Option<String>,
    pub checkout_address: Option<String>,
}

impl AttendanceRecord {
    /// A record with only its key fields set.
    #[cfg(test)]
    pub fn empty(date: NaiveDate, username: &str) -> Self {
        Self {
            date,
            username: username.to_string(),
            checkin_time: None,
            checkout_time: None,
            break_morning_start: None,
            break_morning_end: None,
            break_lunch_start: None,
            break_lunch_end: None,
            break_evening_start: None,
            break_evening_end: None,
            checkin_address: None,
            checkout_address: None,
        }
    }

    pub fn break_window(&self, kind: BreakKind) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
        match kind {
            BreakKind::Morning => (self.break_morning_start, self.break_morning_end),
            BreakKind::Lunch => (self.break_lunch_start, self.break_lunch_end),
            BreakKind::Evening => (self.break_evening_start, self.break_evening_end),
        }
    }
}

/// Attendance row as an upstream data layer may hand it over.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RawAttendanceRecord {
    pub date: Option<String>,
    pub username: Option<String>,
    pub checkin_time: Option<String>,
    pub checkout_time: Option<String>,
    pub break_morning_start: Option<String>,
    pub break_morning_end: Option<String>,
    pub break_lunch_start: Option<String>,
    pub break_lunch_end: Option<String>,
    pub break_evening_start: Option<String>,
    pub break_evening_end: Option<String>,
    pub checkin_address: Option<String>,
    pub checkout_address: Option<String>,
}

fn timestamp(value: Option<String>, field: &'static str) -> Option<NaiveDateTime> {
    let value = value?;
    let parsed = parse_timestamp(&value);
    if parsed.is_none() && !value.trim().is_empty() {
        tracing::warn!(field, value = %value, "Unparseable timestamp treated as missing");
    }
    parsed
}

impl TryFrom<RawAttendanceRecord> for AttendanceRecord {
    type Error = IngestError;

    fn try_from(raw: RawAttendanceRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            date: required_date(raw.date, "date")?,
            username: required(raw.username, "username")?,
            checkin_time: timestamp(raw.checkin_time, "checkin_time"),
            checkout_time: timestamp(raw.checkout_time, "checkout_time"),
            break_morning_start: timestamp(raw.break_morning_start, "break_morning_start"),
            break_morning_end: timestamp(raw.break_morning_end, "break_morning_end"),
            break_lunch_start: timestamp(raw.break_lunch_start, "break_lunch_start"),
            break_lunch_end: timestamp(raw.break_lunch_end, "break_lunch_end"),
            break_evening_start: timestamp(raw.break_evening_start, "break_evening_start"),
            break_evening_end: timestamp(raw.break_evening_end, "break_evening_end"),
            checkin_address: raw.checkin_address,
            checkout_address: raw.checkout_address,
        })
    }
}
