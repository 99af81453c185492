use crate::api::attendance::PunchRequest;
use crate::api::holiday::{CreateHoliday, HolidayQuery};
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse};
use crate::api::timeline::{ComputeRequest, TimelineParams};
use crate::model::attendance::{AttendanceRecord, RawAttendanceRecord};
use crate::model::holiday::{HolidayRecord, RawHolidayRecord};
use crate::model::leave_request::{LeaveRecord, LeaveRequest, LeaveType, RawLeaveRecord};
use crate::timekeeping::TimelineReport;
use crate::timekeeping::classify::{BreakStatus, CheckStatus};
use crate::timekeeping::export::{BreakWindow, TimelineRow};
use crate::timekeeping::filter::StatusFilter;
use crate::timekeeping::rules::{AttendanceRules, BreakAllowance, BreakKind};
use crate::timekeeping::summary::Summary;
use crate::timekeeping::timeline::EntryType;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance API",
        version = "1.0.0",
        description = r#"
## Attendance timekeeping

Daily punches, holidays and approved leave merged into one calendar
timeline per employee.

### 🔹 Key Features
- **Punch capture**
  - Check-in, check-out and three break windows per day
- **Timeline**
  - One row per employee per day: present, absent, leave, holiday or weekly off
  - Check-in/check-out punctuality and break colour bands
  - Filters: all, late, onTime, halfDay
- **Summary & export**
  - Day counts per category, CSV download

### 🔐 Security
All endpoints expect a **JWT Bearer** access token. Employees see only
their own attendance; HR and Admin can view everyone.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::start_break,
        crate::api::attendance::end_break,

        crate::api::timeline::get_timeline,
        crate::api::timeline::get_summary,
        crate::api::timeline::export_timeline,
        crate::api::timeline::compute_timeline,

        crate::api::holiday::list_holidays,
        crate::api::holiday::create_holiday,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave
    ),
    components(
        schemas(
            PunchRequest,
            TimelineParams,
            ComputeRequest,
            TimelineReport,
            TimelineRow,
            BreakWindow,
            Summary,
            EntryType,
            CheckStatus,
            BreakStatus,
            BreakKind,
            StatusFilter,
            AttendanceRules,
            BreakAllowance,
            AttendanceRecord,
            RawAttendanceRecord,
            HolidayRecord,
            RawHolidayRecord,
            HolidayQuery,
            CreateHoliday,
            LeaveRecord,
            RawLeaveRecord,
            LeaveRequest,
            LeaveType,
            CreateLeave,
            LeaveFilter,
            LeaveListResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Attendance", description = "Punches, timelines, summaries and export"),
        (name = "Holiday", description = "Holiday calendar"),
        (name = "Leave", description = "Leave requests"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
