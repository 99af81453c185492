use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::classify::{is_half_day, is_late_day};
use super::rules::AttendanceRules;
use super::timeline::{DayKind, TimelineEntry};

/// Per-category day counts of a timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub present: usize,
    pub absents: usize,
    pub leaves: usize,
    pub holidays: usize,
    pub sundays: usize,
    /// Present days that are half days.
    pub half_days: usize,
    /// Present days with a late check-in or an early check-out.
    pub late_days: usize,
}

pub fn summarize(entries: &[TimelineEntry], rules: &AttendanceRules) -> Summary {
    entries.iter().fold(Summary::default(), |mut acc, entry| {
        match &entry.day {
            DayKind::Present(record) => {
                acc.present += 1;
                if is_half_day(record, rules) {
                    acc.half_days += 1;
                }
                if is_late_day(record, rules) {
                    acc.late_days += 1;
                }
            }
            DayKind::Absent => acc.absents += 1,
            DayKind::Leave { .. } => acc.leaves += 1,
            DayKind::Holiday { .. } => acc.holidays += 1,
            DayKind::Sunday { .. } => acc.sundays += 1,
        }
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceRecord;
    use crate::model::holiday::HolidayRecord;
    use crate::model::leave_request::{LeaveRecord, LeaveType};
    use crate::timekeeping::timeline::{DateRange, Sources, build_user_timeline};
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn punch(d: u32, checkin: (u32, u32), checkout: (u32, u32)) -> AttendanceRecord {
        let day = date(d);
        AttendanceRecord {
            checkin_time: day.and_hms_opt(checkin.0, checkin.1, 0),
            checkout_time: day.and_hms_opt(checkout.0, checkout.1, 0),
            ..AttendanceRecord::empty(day, "asha")
        }
    }

    #[test]
    fn seven_day_week() {
        let rules = AttendanceRules::default();
        // Mon 10 .. Sun 16 June 2024
        let records = [
            punch(10, (10, 30), (18, 30)),
            punch(12, (9, 15), (18, 45)),
            punch(15, (9, 30), (18, 30)),
        ];
        let holidays = [HolidayRecord {
            holiday_date: date(14),
            title: "Founders day".into(),
            description: None,
            is_optional: false,
        }];
        let leaves = [LeaveRecord {
            username: "asha".into(),
            from_date: date(13),
            to_date: date(13),
            leave_type: LeaveType::Sick,
            reason: None,
        }];

        let entries = build_user_timeline(
            "asha",
            DateRange { start: date(10), end: date(16) },
            Sources {
                records: &records,
                holidays: &holidays,
                leaves: &leaves,
            },
            &rules,
        );

        assert_eq!(
            summarize(&entries, &rules),
            Summary {
                present: 3,
                absents: 1,
                leaves: 1,
                holidays: 1,
                sundays: 1,
                half_days: 1,
                // a half day always has a flagged punch, so it is a late day too
                late_days: 1,
            }
        );
    }

    #[test]
    fn half_day_by_early_checkout_without_late_status() {
        let rules = AttendanceRules::default();
        let entries = build_user_timeline(
            "asha",
            DateRange { start: date(12), end: date(12) },
            Sources {
                records: &[punch(12, (9, 0), (18, 13))],
                holidays: &[],
                leaves: &[],
            },
            &rules,
        );
        let summary = summarize(&entries, &rules);
        assert_eq!(summary.half_days, 1);
        assert_eq!(summary.late_days, 1);
    }

    #[test]
    fn late_checkin_that_is_not_a_half_day() {
        let rules = AttendanceRules::default();
        // Wednesday, 09:50 in / 18:30 out
        let entries = build_user_timeline(
            "asha",
            DateRange { start: date(12), end: date(12) },
            Sources {
                records: &[punch(12, (9, 50), (18, 30))],
                holidays: &[],
                leaves: &[],
            },
            &rules,
        );
        let summary = summarize(&entries, &rules);
        assert_eq!(summary.present, 1);
        assert_eq!(summary.late_days, 1);
        assert_eq!(summary.half_days, 0);
    }

    #[test]
    fn empty_timeline() {
        assert_eq!(summarize(&[], &AttendanceRules::default()), Summary::default());
    }
}
