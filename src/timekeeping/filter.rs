use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::classify::{CheckStatus, checkin_status, checkout_status, is_half_day};
use super::rules::AttendanceRules;
use super::timeline::TimelineEntry;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum StatusFilter {
    #[default]
    All,
    Late,
    OnTime,
    HalfDay,
}

/// Whose timeline is being looked at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserSelection {
    User(String),
    All,
}

impl UserSelection {
    /// `None`, blank and `"all"` select everyone.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => UserSelection::All,
            Some(v) if v.eq_ignore_ascii_case("all") => UserSelection::All,
            Some(v) => UserSelection::User(v.to_string()),
        }
    }
}

/// Parsed presentation filters of a timeline request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: StatusFilter,
    pub user: UserSelection,
}

impl Default for TimelineQuery {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            status: StatusFilter::All,
            user: UserSelection::All,
        }
    }
}

/// Whether a timeline entry passes `filter`.
///
/// `OnTime` lets grace punches through although the colour legend shows
/// them apart from on-time ones.
pub fn passes_filter(entry: &TimelineEntry, filter: StatusFilter, rules: &AttendanceRules) -> bool {
    if filter == StatusFilter::All {
        return true;
    }
    let Some(record) = entry.record() else {
        return false;
    };

    let checkin = checkin_status(record.checkin_time, rules);
    let checkout = checkout_status(record.checkout_time, rules);
    let flagged = |s: Option<CheckStatus>| s.is_some_and(CheckStatus::is_flagged);

    match filter {
        StatusFilter::All => true,
        StatusFilter::Late => {
            checkin == Some(CheckStatus::Late) || checkout == Some(CheckStatus::Late)
        }
        StatusFilter::OnTime => !flagged(checkin) && !flagged(checkout),
        StatusFilter::HalfDay => is_half_day(record, rules),
    }
}

pub fn apply_filter(
    mut entries: Vec<TimelineEntry>,
    filter: StatusFilter,
    rules: &AttendanceRules,
) -> Vec<TimelineEntry> {
    entries.retain(|e| passes_filter(e, filter, rules));
    entries
}
