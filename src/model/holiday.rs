use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{IngestError, required_date};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct HolidayRecord {
    #[schema(example = "2024-06-17", format = "date", value_type = String)]
    pub holiday_date: NaiveDate,
    #[schema(example = "Eid al-Adha")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = false)]
    pub is_optional: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RawHolidayRecord {
    pub holiday_date: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_optional: Option<bool>,
}

impl TryFrom<RawHolidayRecord> for HolidayRecord {
    type Error = IngestError;

    fn try_from(raw: RawHolidayRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            holiday_date: required_date(raw.holiday_date, "holiday_date")?,
            title: raw.title.unwrap_or_else(|| "Holiday".to_string()),
            description: raw.description,
            is_optional: raw.is_optional.unwrap_or(false),
        })
    }
}
