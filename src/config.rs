use std::env;
use std::str::FromStr;

use chrono::{NaiveTime, Weekday};
use dotenvy::dotenv;

use crate::timekeeping::rules::AttendanceRules;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub holiday_cache_ttl_secs: u64,

    pub rules: AttendanceRules,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),

            rate_protected_per_min: env_or("RATE_PROTECTED_PER_MIN", 1000),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            holiday_cache_ttl_secs: env_or("HOLIDAY_CACHE_TTL_SECS", 3600),

            rules: rules_from(|key| env::var(key).ok()),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    parse_or(key, env::var(key).ok(), default, |v| v.parse().ok())
}

/// Parse an override, keeping `default` when it is unset or invalid.
fn parse_or<T>(key: &str, raw: Option<String>, default: T, parse: impl Fn(&str) -> Option<T>) -> T {
    match raw {
        None => default,
        Some(value) => parse(value.trim()).unwrap_or_else(|| {
            tracing::warn!(key, value = %value, "Invalid config value, using default");
            default
        }),
    }
}

fn clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Build the rule set from `ATTENDANCE_*` overrides on top of the defaults.
pub fn rules_from(lookup: impl Fn(&str) -> Option<String>) -> AttendanceRules {
    let d = AttendanceRules::default();
    let num = |key: &str, default: i64| parse_or(key, lookup(key), default, |v| v.parse().ok());
    let time = |key: &str, default: NaiveTime| parse_or(key, lookup(key), default, clock);

    AttendanceRules {
        checkin_time: time("ATTENDANCE_CHECKIN_TIME", d.checkin_time),
        checkin_grace_minutes: parse_or(
            "ATTENDANCE_CHECKIN_GRACE_MINUTES",
            lookup("ATTENDANCE_CHECKIN_GRACE_MINUTES"),
            d.checkin_grace_minutes,
            |v| v.parse().ok(),
        ),
        checkin_half_day_at: time("ATTENDANCE_CHECKIN_HALF_DAY_AT", d.checkin_half_day_at),
        checkout_time: time("ATTENDANCE_CHECKOUT_TIME", d.checkout_time),
        checkout_half_day_before: time(
            "ATTENDANCE_CHECKOUT_HALF_DAY_BEFORE",
            d.checkout_half_day_before,
        ),
        checkout_late_until: time("ATTENDANCE_CHECKOUT_LATE_UNTIL", d.checkout_late_until),
        breaks: crate::timekeeping::rules::BreakAllowance {
            morning: num("ATTENDANCE_BREAK_MORNING_MINUTES", d.breaks.morning),
            lunch: num("ATTENDANCE_BREAK_LUNCH_MINUTES", d.breaks.lunch),
            evening: num("ATTENDANCE_BREAK_EVENING_MINUTES", d.breaks.evening),
            grace: num("ATTENDANCE_BREAK_GRACE_MINUTES", d.breaks.grace),
        },
        weekly_off: parse_or(
            "ATTENDANCE_WEEKLY_OFF",
            lookup("ATTENDANCE_WEEKLY_OFF"),
            d.weekly_off,
            |v| Weekday::from_str(v).ok(),
        ),
        lookback_days: num("ATTENDANCE_LOOKBACK_DAYS", d.lookback_days),
        max_range_days: parse_or(
            "ATTENDANCE_MAX_RANGE_DAYS",
            lookup("ATTENDANCE_MAX_RANGE_DAYS"),
            d.max_range_days,
            |v| v.parse().ok().filter(|n: &i64| *n > 0),
        ),
    }
}
