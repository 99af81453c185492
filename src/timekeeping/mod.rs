//! Attendance timekeeping: punch classification, calendar timelines and
//! their summaries.
//!
//! Everything here is pure and works on data that was already fetched.
//! The HTTP layer resolves who may see what and hands over the rows.

pub mod classify;
pub mod export;
pub mod filter;
pub mod rules;
pub mod summary;
pub mod timeline;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use export::{TimelineRow, to_rows};
use filter::{TimelineQuery, UserSelection, apply_filter};
use rules::AttendanceRules;
use summary::{Summary, summarize};
use timeline::{Sources, TimelineEntry, build_team_timeline, known_usernames};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TimelineReport {
    pub rows: Vec<TimelineRow>,
    pub summary: Summary,
}

/// Filtered timeline entries for `query`, newest first.
///
/// With [`UserSelection::All`] the timeline covers `roster` plus anyone
/// present in the punch or leave data.
pub fn timeline_entries(
    query: &TimelineQuery,
    roster: &[String],
    today: NaiveDate,
    sources: Sources<'_>,
    rules: &AttendanceRules,
) -> Vec<TimelineEntry> {
    let usernames = match &query.user {
        UserSelection::User(name) => vec![name.clone()],
        UserSelection::All => {
            let mut names = roster.to_vec();
            names.extend(known_usernames(sources.records, sources.leaves));
            names
        }
    };

    let entries = build_team_timeline(&usernames, query.from, query.to, today, sources, rules);
    apply_filter(entries, query.status, rules)
}

pub fn build_report(
    query: &TimelineQuery,
    roster: &[String],
    today: NaiveDate,
    sources: Sources<'_>,
    rules: &AttendanceRules,
) -> TimelineReport {
    let entries = timeline_entries(query, roster, today, sources, rules);
    TimelineReport {
        summary: summarize(&entries, rules),
        rows: to_rows(&entries, rules),
    }
}
