use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use strum::IntoEnumIterator;
use utoipa::ToSchema;

use super::classify::{BreakStatus, CheckStatus, break_status, checkin_status, checkout_status, is_half_day, is_late_day};
use super::rules::{AttendanceRules, BreakKind};
use super::timeline::{DayKind, EntryType, TimelineEntry};
use crate::model::leave_request::LeaveType;
use crate::utils::datetime::date_key;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BreakWindow {
    pub kind: BreakKind,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub start: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub end: Option<NaiveDateTime>,
    pub status: Option<BreakStatus>,
}

/// A timeline day with every derived status filled in, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TimelineRow {
    #[schema(example = "2024-06-12", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "asha")]
    pub username: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(format = "date-time", value_type = Option<String>)]
    pub checkin_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(format = "date-time", value_type = Option<String>)]
    pub checkout_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_status: Option<CheckStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_status: Option<CheckStatus>,
    pub is_half_day: bool,
    pub is_late: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub breaks: Vec<BreakWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_address: Option<String>,

    /// Weekday name, holiday title or leave type, depending on `type`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_optional: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave_type: Option<LeaveType>,
}

impl TimelineRow {
    pub fn from_entry(entry: &TimelineEntry, rules: &AttendanceRules) -> Self {
        let mut row = Self {
            date: entry.date,
            username: entry.username.clone(),
            entry_type: entry.entry_type(),
            checkin_time: None,
            checkout_time: None,
            checkin_status: None,
            checkout_status: None,
            is_half_day: false,
            is_late: false,
            breaks: Vec::new(),
            checkin_address: None,
            checkout_address: None,
            label: None,
            description: None,
            is_optional: None,
            leave_type: None,
        };

        match &entry.day {
            DayKind::Present(record) => {
                row.checkin_time = record.checkin_time;
                row.checkout_time = record.checkout_time;
                row.checkin_status = checkin_status(record.checkin_time, rules);
                row.checkout_status = checkout_status(record.checkout_time, rules);
                row.is_half_day = is_half_day(record, rules);
                row.is_late = is_late_day(record, rules);
                row.breaks = BreakKind::iter()
                    .map(|kind| {
                        let (start, end) = record.break_window(kind);
                        BreakWindow {
                            kind,
                            start,
                            end,
                            status: break_status(start, end, kind, rules),
                        }
                    })
                    .collect();
                row.checkin_address = record.checkin_address.clone();
                row.checkout_address = record.checkout_address.clone();
            }
            DayKind::Sunday { label } => row.label = Some(label.clone()),
            DayKind::Holiday {
                title,
                description,
                is_optional,
            } => {
                row.label = Some(title.clone());
                row.description = description.clone();
                row.is_optional = Some(*is_optional);
            }
            DayKind::Leave { leave_type, reason } => {
                row.label = Some(leave_type.to_string());
                row.description = reason.clone();
                row.leave_type = Some(*leave_type);
            }
            DayKind::Absent => {}
        }
        row
    }
}

pub fn to_rows(entries: &[TimelineEntry], rules: &AttendanceRules) -> Vec<TimelineRow> {
    entries.iter().map(|e| TimelineRow::from_entry(e, rules)).collect()
}

pub const CSV_HEADER: [&str; 10] = [
    "Date",
    "User",
    "Type",
    "Check-in",
    "Check-out",
    "Morning Break",
    "Lunch Break",
    "Evening Break",
    "Check-in Address",
    "Check-out Address",
];

fn clock(t: Option<NaiveDateTime>) -> String {
    t.map(|t| t.format("%H:%M:%S").to_string()).unwrap_or_default()
}

fn window(b: Option<&BreakWindow>) -> String {
    match b {
        Some(BreakWindow { start: None, end: None, .. }) | None => String::new(),
        Some(b) => format!("{}-{}", clock(b.start), clock(b.end)),
    }
}

/// One spreadsheet line per row.
pub fn export_record(row: &TimelineRow) -> [String; 10] {
    let find = |kind: BreakKind| row.breaks.iter().find(|b| b.kind == kind);
    [
        date_key(row.date),
        free_text(&row.username),
        row.entry_type.to_string(),
        clock(row.checkin_time),
        clock(row.checkout_time),
        window(find(BreakKind::Morning)),
        window(find(BreakKind::Lunch)),
        window(find(BreakKind::Evening)),
        free_text(row.checkin_address.as_deref().unwrap_or_default()),
        free_text(row.checkout_address.as_deref().unwrap_or_default()),
    ]
}

/// User-entered text must not be read as a spreadsheet formula.
fn free_text(value: &str) -> String {
    if value.starts_with(['=', '+', '-', '@', '\t', '\r']) {
        format!("'{value}")
    } else {
        value.to_string()
    }
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render rows as CSV with a header line, CRLF separated.
pub fn to_csv(rows: &[TimelineRow]) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push_str("\r\n");
    for row in rows {
        let line: Vec<String> = export_record(row).iter().map(|f| escape(f)).collect();
        out.push_str(&line.join(","));
        out.push_str("\r\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceRecord;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()
    }

    fn present_entry() -> TimelineEntry {
        let d = day();
        let record = AttendanceRecord {
            checkin_time: d.and_hms_opt(9, 50, 0),
            checkout_time: d.and_hms_opt(18, 30, 0),
            break_lunch_start: d.and_hms_opt(13, 0, 0),
            break_lunch_end: d.and_hms_opt(13, 40, 0),
            checkin_address: Some("House 4, Road 7, Dhaka".into()),
            ..AttendanceRecord::empty(d, "asha")
        };
        TimelineEntry {
            date: d,
            username: "asha".into(),
            day: DayKind::Present(record),
        }
    }

    #[test]
    fn present_row_carries_statuses() {
        let rules = AttendanceRules::default();
        let row = TimelineRow::from_entry(&present_entry(), &rules);

        assert_eq!(row.entry_type, EntryType::Present);
        assert_eq!(row.checkin_status, Some(CheckStatus::Late));
        assert_eq!(row.checkout_status, Some(CheckStatus::OnTime));
        assert!(!row.is_half_day);
        assert!(row.is_late);
        assert_eq!(row.breaks.len(), 3);
        assert_eq!(row.breaks[0].status, None);
        assert_eq!(row.breaks[1].status, Some(BreakStatus::Red));
    }

    #[test]
    fn leave_row_labels() {
        let rules = AttendanceRules::default();
        let entry = TimelineEntry {
            date: day(),
            username: "asha".into(),
            day: DayKind::Leave {
                leave_type: LeaveType::Casual,
                reason: Some("wedding".into()),
            },
        };
        let row = TimelineRow::from_entry(&entry, &rules);
        assert_eq!(row.label.as_deref(), Some("casual"));
        assert_eq!(row.description.as_deref(), Some("wedding"));
        assert!(row.breaks.is_empty());
    }

    #[test]
    fn row_json_uses_type_key() {
        let rules = AttendanceRules::default();
        let entry = TimelineEntry {
            date: day(),
            username: "asha".into(),
            day: DayKind::Absent,
        };
        let json = serde_json::to_value(TimelineRow::from_entry(&entry, &rules)).unwrap();
        assert_eq!(json["type"], "absent");
        assert_eq!(json["date"], "2024-06-12");
        assert!(json.get("checkin_status").is_none());
    }

    #[test]
    fn csv_layout() {
        let rules = AttendanceRules::default();
        let rows = to_rows(&[present_entry()], &rules);
        let csv = to_csv(&rows);
        let lines: Vec<&str> = csv.split("\r\n").collect();

        assert_eq!(
            lines[0],
            "Date,User,Type,Check-in,Check-out,Morning Break,Lunch Break,Evening Break,Check-in Address,Check-out Address"
        );
        assert_eq!(
            lines[1],
            "2024-06-12,asha,present,09:50:00,18:30:00,,13:00:00-13:40:00,,\"House 4, Road 7, Dhaka\","
        );
        assert_eq!(lines[2], "");
    }

    #[test]
    fn csv_defuses_formula_addresses() {
        let rules = AttendanceRules::default();
        let mut entry = present_entry();
        if let DayKind::Present(record) = &mut entry.day {
            record.checkin_address = Some("=HYPERLINK(\"http://x\")".into());
            record.checkout_address = Some("@SUM(A1)".into());
        }
        let fields = export_record(&TimelineRow::from_entry(&entry, &rules));

        assert_eq!(fields[8], "'=HYPERLINK(\"http://x\")");
        assert_eq!(fields[9], "'@SUM(A1)");
        assert_eq!(free_text("-3"), "'-3");
        assert_eq!(free_text("Road 7"), "Road 7");
    }

    #[test]
    fn csv_escapes_quotes() {
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("plain"), "plain");
    }
}
