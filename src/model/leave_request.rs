use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::{IngestError, required, required_date};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LeaveType {
    Sick,
    Paid,
    Casual,
    Unpaid,
}

/// An approved absence covering `from_date..=to_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaveRecord {
    #[schema(example = "asha")]
    pub username: String,
    #[schema(example = "2024-06-10", format = "date", value_type = String)]
    pub from_date: NaiveDate,
    #[schema(example = "2024-06-12", format = "date", value_type = String)]
    pub to_date: NaiveDate,
    pub leave_type: LeaveType,
    pub reason: Option<String>,
}

impl LeaveRecord {
    /// Every calendar day covered, both ends included. Empty if the range is inverted.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.from_date
            .iter_days()
            .take_while(move |d| *d <= self.to_date)
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RawLeaveRecord {
    pub username: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub leave_type: Option<String>,
    pub reason: Option<String>,
}

impl TryFrom<RawLeaveRecord> for LeaveRecord {
    type Error = IngestError;

    fn try_from(raw: RawLeaveRecord) -> Result<Self, Self::Error> {
        let leave_type = required(raw.leave_type, "leave_type")?;
        Ok(Self {
            username: required(raw.username, "username")?,
            from_date: required_date(raw.from_date, "from_date")?,
            to_date: required_date(raw.to_date, "to_date")?,
            leave_type: LeaveType::from_str(&leave_type)
                .map_err(|_| IngestError::UnknownLeaveType(leave_type))?,
            reason: raw.reason,
        })
    }
}

/// Row of the `leave_requests` table.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "asha")]
    pub username: String,
    #[schema(example = "2024-06-10", format = "date", value_type = String)]
    pub from_date: NaiveDate,
    #[schema(example = "2024-06-12", format = "date", value_type = String)]
    pub to_date: NaiveDate,
    #[schema(example = "sick")]
    pub leave_type: String,
    pub reason: Option<String>,
    #[schema(example = "pending")]
    pub status: String,
}

impl TryFrom<LeaveRequest> for LeaveRecord {
    type Error = IngestError;

    fn try_from(row: LeaveRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            leave_type: LeaveType::from_str(&row.leave_type)
                .map_err(|_| IngestError::UnknownLeaveType(row.leave_type.clone()))?,
            username: row.username,
            from_date: row.from_date,
            to_date: row.to_date,
            reason: row.reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn leave(from: u32, to: u32) -> LeaveRecord {
        LeaveRecord {
            username: "asha".into(),
            from_date: date(from),
            to_date: date(to),
            leave_type: LeaveType::Sick,
            reason: None,
        }
    }

    #[test]
    fn days_are_inclusive() {
        let days: Vec<_> = leave(10, 12).days().collect();
        assert_eq!(days, vec![date(10), date(11), date(12)]);
    }

    #[test]
    fn single_day_leave() {
        assert_eq!(leave(10, 10).days().count(), 1);
    }

    #[test]
    fn inverted_leave_covers_nothing() {
        assert_eq!(leave(12, 10).days().count(), 0);
    }

    #[test]
    fn leave_type_is_case_insensitive() {
        let raw = RawLeaveRecord {
            username: Some("asha".into()),
            from_date: Some("2024-06-10".into()),
            to_date: Some("2024-06-12".into()),
            leave_type: Some("Casual".into()),
            reason: Some("family".into()),
        };
        assert_eq!(LeaveRecord::try_from(raw).unwrap().leave_type, LeaveType::Casual);
    }

    #[test]
    fn unknown_leave_type_is_rejected() {
        let raw = RawLeaveRecord {
            username: Some("asha".into()),
            from_date: Some("2024-06-10".into()),
            to_date: Some("2024-06-10".into()),
            leave_type: Some("annual".into()),
            reason: None,
        };
        assert_eq!(
            LeaveRecord::try_from(raw).unwrap_err(),
            IngestError::UnknownLeaveType("annual".into())
        );
    }
}
