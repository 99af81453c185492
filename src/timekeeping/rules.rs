use chrono::{Duration, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// The three recorded break windows of a working day.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BreakKind {
    Morning,
    Lunch,
    Evening,
}

/// Allowed break lengths in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BreakAllowance {
    pub morning: i64,
    pub lunch: i64,
    pub evening: i64,
    /// Extra minutes past the allowance that still count as yellow.
    pub grace: i64,
}

impl BreakAllowance {
    pub fn allowed(&self, kind: BreakKind) -> i64 {
        match kind {
            BreakKind::Morning => self.morning,
            BreakKind::Lunch => self.lunch,
            BreakKind::Evening => self.evening,
        }
    }
}

impl Default for BreakAllowance {
    fn default() -> Self {
        Self {
            morning: 15,
            lunch: 30,
            evening: 15,
            grace: 5,
        }
    }
}

/// Timekeeping rule set for one tenant.
///
/// Times are wall-clock boundaries. Check-in bands are inclusive upper
/// bounds, check-out bands are exclusive upper bounds:
///
/// ```text
/// check-in   ..=09:30 onTime | ..=09:45 grace | ..10:00 late | halfDay
/// check-out  ..18:14 halfDay | ..18:15 late | ..18:30 grace | onTime
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRules {
    #[schema(value_type = String, example = "09:30:00")]
    pub checkin_time: NaiveTime,
    pub checkin_grace_minutes: u32,
    /// First minute of the check-in half-day band.
    #[schema(value_type = String, example = "10:00:00")]
    pub checkin_half_day_at: NaiveTime,

    #[schema(value_type = String, example = "18:30:00")]
    pub checkout_time: NaiveTime,
    /// Check-outs before this minute are half days.
    #[schema(value_type = String, example = "18:14:00")]
    pub checkout_half_day_before: NaiveTime,
    /// Last minute of the check-out late band.
    #[schema(value_type = String, example = "18:14:00")]
    pub checkout_late_until: NaiveTime,

    pub breaks: BreakAllowance,

    #[schema(value_type = String, example = "Sun")]
    pub weekly_off: Weekday,
    /// Range start used when neither a filter nor any punch gives one.
    pub lookback_days: i64,
    /// Widest timeline, in days, a single request may cover.
    pub max_range_days: i64,
}

impl Default for AttendanceRules {
    fn default() -> Self {
        Self {
            checkin_time: hm(9, 30),
            checkin_grace_minutes: 15,
            checkin_half_day_at: hm(10, 0),
            checkout_time: hm(18, 30),
            checkout_half_day_before: hm(18, 14),
            checkout_late_until: hm(18, 14),
            breaks: BreakAllowance::default(),
            weekly_off: Weekday::Sun,
            lookback_days: 30,
            max_range_days: 366,
        }
    }
}

impl AttendanceRules {
    pub fn checkin_on_time_until(&self) -> u32 {
        minute_of_day(self.checkin_time)
    }

    pub fn checkin_grace_until(&self) -> u32 {
        self.checkin_on_time_until() + self.checkin_grace_minutes
    }

    pub fn checkin_half_day_from(&self) -> u32 {
        minute_of_day(self.checkin_half_day_at)
    }

    pub fn checkout_half_day_below(&self) -> u32 {
        minute_of_day(self.checkout_half_day_before)
    }

    pub fn checkout_late_below(&self) -> u32 {
        minute_of_day(self.checkout_late_until) + 1
    }

    pub fn checkout_grace_below(&self) -> u32 {
        minute_of_day(self.checkout_time)
    }

    /// `end - lookback_days`, saturating at the calendar's first day.
    pub fn lookback_start(&self, end: NaiveDate) -> NaiveDate {
        days_before(end, self.lookback_days)
    }

    /// Earliest start a timeline ending on `end` may have.
    pub fn earliest_start(&self, end: NaiveDate) -> NaiveDate {
        days_before(end, self.max_range_days.max(1) - 1)
    }
}

/// `date - days` without overflowing the supported calendar.
pub fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days.max(0))
        .and_then(|d| date.checked_sub_signed(d))
        .unwrap_or(NaiveDate::MIN)
}

/// Minutes since local midnight, seconds dropped.
pub fn minute_of_day(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn default_boundaries_in_minutes() {
        let rules = AttendanceRules::default();
        assert_eq!(rules.checkin_on_time_until(), 570);
        assert_eq!(rules.checkin_grace_until(), 585);
        assert_eq!(rules.checkin_half_day_from(), 600);
        assert_eq!(rules.checkout_half_day_below(), 1094);
        assert_eq!(rules.checkout_late_below(), 1095);
        assert_eq!(rules.checkout_grace_below(), 1110);
    }

    #[test]
    fn day_arithmetic_saturates_at_calendar_start() {
        let rules = AttendanceRules::default();
        let june = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        assert_eq!(rules.lookback_start(june), NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
        assert_eq!(rules.earliest_start(june), NaiveDate::from_ymd_opt(2023, 7, 1).unwrap());

        let first = NaiveDate::MIN + Duration::days(3);
        assert_eq!(rules.lookback_start(first), NaiveDate::MIN);
        assert_eq!(rules.earliest_start(first), NaiveDate::MIN);
        assert_eq!(days_before(june, i64::MAX), NaiveDate::MIN);
    }

    #[test]
    fn break_allowances() {
        let breaks = BreakAllowance::default();
        assert_eq!(breaks.allowed(BreakKind::Morning), 15);
        assert_eq!(breaks.allowed(BreakKind::Lunch), 30);
        assert_eq!(breaks.allowed(BreakKind::Evening), 15);
        assert_eq!(breaks.grace, 5);
    }

    #[test]
    fn break_kind_parses_from_path_segment() {
        assert_eq!(BreakKind::from_str("lunch").unwrap(), BreakKind::Lunch);
        assert_eq!(BreakKind::Evening.to_string(), "evening");
        assert!(BreakKind::from_str("tea").is_err());
    }
}
