use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use strum_macros::Display;
use utoipa::ToSchema;

use super::rules::AttendanceRules;
use crate::model::attendance::AttendanceRecord;
use crate::model::holiday::HolidayRecord;
use crate::model::leave_request::{LeaveRecord, LeaveType};

/// Inclusive calendar range of local dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Resolve the range for one employee.
    ///
    /// `end` is the explicit filter or `today`. `start` is the explicit
    /// filter, else the employee's earliest punch, else `end - lookback`,
    /// never more than `max_range_days` before `end`.
    pub fn resolve(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        records: &[AttendanceRecord],
        today: NaiveDate,
        rules: &AttendanceRules,
    ) -> Self {
        let end = to.unwrap_or(today);
        let start = from
            .or_else(|| records.iter().map(|r| r.date).min())
            .unwrap_or_else(|| rules.lookback_start(end));
        Self {
            start: start.max(rules.earliest_start(end)),
            end,
        }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

/// Category tag of a timeline day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryType {
    Present,
    Absent,
    Leave,
    Holiday,
    Sunday,
}

/// What happened on a timeline day, with the data that decided it.
#[derive(Debug, Clone, PartialEq)]
pub enum DayKind {
    Present(AttendanceRecord),
    /// Weekly off. `label` is the weekday name.
    Sunday { label: String },
    Holiday {
        title: String,
        description: Option<String>,
        is_optional: bool,
    },
    Leave {
        leave_type: LeaveType,
        reason: Option<String>,
    },
    Absent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub date: NaiveDate,
    pub username: String,
    pub day: DayKind,
}

/// Already-fetched input data. Rows of any employee may be mixed in.
#[derive(Debug, Clone, Copy)]
pub struct Sources<'a> {
    pub records: &'a [AttendanceRecord],
    pub holidays: &'a [HolidayRecord],
    pub leaves: &'a [LeaveRecord],
}

impl TimelineEntry {
    pub fn entry_type(&self) -> EntryType {
        match self.day {
            DayKind::Present(_) => EntryType::Present,
            DayKind::Sunday { .. } => EntryType::Sunday,
            DayKind::Holiday { .. } => EntryType::Holiday,
            DayKind::Leave { .. } => EntryType::Leave,
            DayKind::Absent => EntryType::Absent,
        }
    }

    pub fn record(&self) -> Option<&AttendanceRecord> {
        match &self.day {
            DayKind::Present(record) => Some(record),
            _ => None,
        }
    }
}

/// Build one employee's timeline over `range`, newest day first.
///
/// Only `username`'s punches and leaves are used. Holidays apply to everyone.
pub fn build_user_timeline(
    username: &str,
    range: DateRange,
    sources: Sources<'_>,
    rules: &AttendanceRules,
) -> Vec<TimelineEntry> {
    let punches: HashMap<NaiveDate, &AttendanceRecord> = sources
        .records
        .iter()
        .filter(|r| r.username == username)
        .map(|r| (r.date, r))
        .collect();

    let holiday_by_day: HashMap<NaiveDate, &HolidayRecord> =
        sources.holidays.iter().map(|h| (h.holiday_date, h)).collect();

    let mut leave_by_day: HashMap<NaiveDate, &LeaveRecord> = HashMap::new();
    for leave in sources.leaves.iter().filter(|l| l.username == username) {
        for day in leave.days() {
            leave_by_day.insert(day, leave);
        }
    }

    let mut entries: Vec<TimelineEntry> = range
        .days()
        .map(|date| {
            let day = if let Some(record) = punches.get(&date) {
                DayKind::Present((*record).clone())
            } else if date.weekday() == rules.weekly_off {
                DayKind::Sunday {
                    label: weekday_label(date),
                }
            } else if let Some(holiday) = holiday_by_day.get(&date) {
                DayKind::Holiday {
                    title: holiday.title.clone(),
                    description: holiday.description.clone(),
                    is_optional: holiday.is_optional,
                }
            } else if let Some(leave) = leave_by_day.get(&date) {
                DayKind::Leave {
                    leave_type: leave.leave_type,
                    reason: leave.reason.clone(),
                }
            } else {
                DayKind::Absent
            };

            TimelineEntry {
                date,
                username: username.to_string(),
                day,
            }
        })
        .collect();

    entries.reverse();
    entries
}

/// Timelines for several employees, merged newest first.
///
/// Each employee gets an independently resolved range, so someone whose
/// first punch is recent does not get a tail of absences before it.
pub fn build_team_timeline(
    usernames: &[String],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
    sources: Sources<'_>,
    rules: &AttendanceRules,
) -> Vec<TimelineEntry> {
    let unique: BTreeSet<&str> = usernames.iter().map(String::as_str).collect();

    let mut merged: Vec<TimelineEntry> = unique
        .into_iter()
        .flat_map(|username| {
            let own: Vec<AttendanceRecord> = sources
                .records
                .iter()
                .filter(|r| r.username == username)
                .cloned()
                .collect();
            let range = DateRange::resolve(from, to, &own, today, rules);
            build_user_timeline(username, range, sources, rules)
        })
        .collect();

    merged.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.username.cmp(&b.username)));
    merged
}

/// Everyone who appears in the punch or leave data.
pub fn known_usernames(records: &[AttendanceRecord], leaves: &[LeaveRecord]) -> Vec<String> {
    let names: BTreeSet<&str> = records
        .iter()
        .map(|r| r.username.as_str())
        .chain(leaves.iter().map(|l| l.username.as_str()))
        .collect();
    names.into_iter().map(str::to_string).collect()
}

fn weekday_label(date: NaiveDate) -> String {
    date.format("%A").to_string()
}
