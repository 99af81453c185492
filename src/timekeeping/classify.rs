use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

use super::rules::{minute_of_day, AttendanceRules, BreakKind};
use crate::model::attendance::AttendanceRecord;

/// Punctuality of a single check-in or check-out punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum CheckStatus {
    OnTime,
    Grace,
    Late,
    HalfDay,
}

impl CheckStatus {
    /// Late and half-day punches both count against the employee.
    pub fn is_flagged(self) -> bool {
        matches!(self, CheckStatus::Late | CheckStatus::HalfDay)
    }
}

/// Colour band of a break duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BreakStatus {
    Green,
    Yellow,
    Red,
}

pub fn checkin_status(checkin: Option<NaiveDateTime>, rules: &AttendanceRules) -> Option<CheckStatus> {
    let m = minute_of_day(checkin?.time());

    let status = if m <= rules.checkin_on_time_until() {
        CheckStatus::OnTime
    } else if m <= rules.checkin_grace_until() {
        CheckStatus::Grace
    } else if m < rules.checkin_half_day_from() {
        CheckStatus::Late
    } else {
        CheckStatus::HalfDay
    };
    Some(status)
}

pub fn checkout_status(checkout: Option<NaiveDateTime>, rules: &AttendanceRules) -> Option<CheckStatus> {
    let m = minute_of_day(checkout?.time());

    // The late band is the single minute 18:14, below it is already a half
    // day. Kept as observed in the existing product; needs product-owner
    // confirmation before it is widened.
    let status = if m < rules.checkout_half_day_below() {
        CheckStatus::HalfDay
    } else if m < rules.checkout_late_below() {
        CheckStatus::Late
    } else if m < rules.checkout_grace_below() {
        CheckStatus::Grace
    } else {
        CheckStatus::OnTime
    };
    Some(status)
}

pub fn is_checkin_late(checkin: Option<NaiveDateTime>, rules: &AttendanceRules) -> bool {
    checkin_status(checkin, rules).is_some_and(CheckStatus::is_flagged)
}

pub fn is_checkout_early(checkout: Option<NaiveDateTime>, rules: &AttendanceRules) -> bool {
    checkout_status(checkout, rules).is_some_and(CheckStatus::is_flagged)
}

pub fn break_status(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    kind: BreakKind,
    rules: &AttendanceRules,
) -> Option<BreakStatus> {
    let (start, end) = (start?, end?);
    let minutes = (end - start).num_seconds().div_euclid(60);
    let allowed = rules.breaks.allowed(kind);

    let status = if minutes <= allowed {
        BreakStatus::Green
    } else if minutes <= allowed + rules.breaks.grace {
        BreakStatus::Yellow
    } else {
        BreakStatus::Red
    };
    Some(status)
}

/// Half-day test used by the half-day counter and filter.
///
/// Independent of [`checkin_status`]/[`checkout_status`]: a 10:00 check-in
/// is `HalfDay` by status but not a half day here.
pub fn is_half_day(record: &AttendanceRecord, rules: &AttendanceRules) -> bool {
    match (record.checkin_time, record.checkout_time) {
        (Some(checkin), Some(checkout)) => {
            checkin.time() > rules.checkin_half_day_at
                || checkout.time() < rules.checkout_half_day_before
        }
        _ => false,
    }
}

/// Check-in late or check-out early.
pub fn is_late_day(record: &AttendanceRecord, rules: &AttendanceRules) -> bool {
    is_checkin_late(record.checkin_time, rules) || is_checkout_early(record.checkout_time, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at_minute(m: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 6, 12)
            .unwrap()
            .and_hms_opt(m / 60, m % 60, 0)
    }

    fn record(checkin: (u32, u32), checkout: (u32, u32)) -> AttendanceRecord {
        let day = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        AttendanceRecord {
            checkin_time: day.and_hms_opt(checkin.0, checkin.1, 0),
            checkout_time: day.and_hms_opt(checkout.0, checkout.1, 0),
            ..AttendanceRecord::empty(day, "asha")
        }
    }

    #[test]
    fn checkin_boundaries() {
        let rules = AttendanceRules::default();
        let cases = [
            (0, CheckStatus::OnTime),
            (570, CheckStatus::OnTime),
            (571, CheckStatus::Grace),
            (585, CheckStatus::Grace),
            (586, CheckStatus::Late),
            (599, CheckStatus::Late),
            (600, CheckStatus::HalfDay),
            (1439, CheckStatus::HalfDay),
        ];
        for (m, expected) in cases {
            assert_eq!(checkin_status(at_minute(m), &rules), Some(expected), "minute {m}");
        }
    }

    #[test]
    fn checkout_boundaries() {
        let rules = AttendanceRules::default();
        let cases = [
            (600, CheckStatus::HalfDay),
            (1093, CheckStatus::HalfDay),
            (1094, CheckStatus::Late),
            (1095, CheckStatus::Grace),
            (1109, CheckStatus::Grace),
            (1110, CheckStatus::OnTime),
            (1380, CheckStatus::OnTime),
        ];
        for (m, expected) in cases {
            assert_eq!(checkout_status(at_minute(m), &rules), Some(expected), "minute {m}");
        }
    }

    #[test]
    fn checkout_late_band_is_exactly_one_minute() {
        let rules = AttendanceRules::default();
        let late: Vec<u32> = (1000..1200)
            .filter(|&m| checkout_status(at_minute(m), &rules) == Some(CheckStatus::Late))
            .collect();
        assert_eq!(late, vec![1094]);
    }

    #[test]
    fn seconds_do_not_move_the_band() {
        let rules = AttendanceRules::default();
        let t = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap().and_hms_opt(9, 30, 59);
        assert_eq!(checkin_status(t, &rules), Some(CheckStatus::OnTime));
    }

    #[test]
    fn missing_punch_has_no_status() {
        let rules = AttendanceRules::default();
        assert_eq!(checkin_status(None, &rules), None);
        assert_eq!(checkout_status(None, &rules), None);
        assert!(!is_checkin_late(None, &rules));
        assert!(!is_checkout_early(None, &rules));
    }

    #[test]
    fn late_and_early_flags() {
        let rules = AttendanceRules::default();
        assert!(!is_checkin_late(at_minute(585), &rules));
        assert!(is_checkin_late(at_minute(590), &rules));
        assert!(is_checkin_late(at_minute(620), &rules));
        assert!(is_checkout_early(at_minute(1094), &rules));
        assert!(is_checkout_early(at_minute(1000), &rules));
        assert!(!is_checkout_early(at_minute(1100), &rules));
    }

    #[test]
    fn break_bands() {
        let rules = AttendanceRules::default();
        let start = at_minute(660).unwrap();
        let after = |mins: i64| Some(start + Duration::minutes(mins));

        for (kind, allowed) in [(BreakKind::Morning, 15), (BreakKind::Lunch, 30), (BreakKind::Evening, 15)] {
            assert_eq!(break_status(Some(start), after(allowed), kind, &rules), Some(BreakStatus::Green));
            assert_eq!(break_status(Some(start), after(allowed + 5), kind, &rules), Some(BreakStatus::Yellow));
            assert_eq!(break_status(Some(start), after(allowed + 6), kind, &rules), Some(BreakStatus::Red));
        }
    }

    #[test]
    fn break_duration_is_floored() {
        let rules = AttendanceRules::default();
        let start = at_minute(660).unwrap();
        let end = start + Duration::seconds(15 * 60 + 59);
        assert_eq!(
            break_status(Some(start), Some(end), BreakKind::Morning, &rules),
            Some(BreakStatus::Green)
        );
    }

    #[test]
    fn break_missing_endpoint() {
        let rules = AttendanceRules::default();
        assert_eq!(break_status(at_minute(660), None, BreakKind::Lunch, &rules), None);
        assert_eq!(break_status(None, at_minute(690), BreakKind::Lunch, &rules), None);
    }

    #[test]
    fn half_day_needs_both_punches() {
        let rules = AttendanceRules::default();
        let mut r = record((10, 30), (18, 30));
        assert!(is_half_day(&r, &rules));
        r.checkout_time = None;
        assert!(!is_half_day(&r, &rules));
    }

    #[test]
    fn half_day_thresholds_are_strict() {
        let rules = AttendanceRules::default();
        assert!(!is_half_day(&record((10, 0), (18, 30)), &rules));
        assert!(is_half_day(&record((10, 1), (18, 30)), &rules));
        assert!(!is_half_day(&record((9, 0), (18, 14)), &rules));
        assert!(is_half_day(&record((9, 0), (18, 13)), &rules));
    }

    #[test]
    fn status_and_half_day_paths_may_disagree() {
        let rules = AttendanceRules::default();
        let r = record((10, 0), (18, 30));
        assert_eq!(checkin_status(r.checkin_time, &rules), Some(CheckStatus::HalfDay));
        assert!(!is_half_day(&r, &rules));
    }

    #[test]
    fn custom_rules_shift_the_bands() {
        let rules = AttendanceRules {
            checkin_time: chrono::NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            checkin_grace_minutes: 10,
            ..AttendanceRules::default()
        };
        assert_eq!(checkin_status(at_minute(480), &rules), Some(CheckStatus::OnTime));
        assert_eq!(checkin_status(at_minute(490), &rules), Some(CheckStatus::Grace));
        assert_eq!(checkin_status(at_minute(491), &rules), Some(CheckStatus::Late));
    }
}
