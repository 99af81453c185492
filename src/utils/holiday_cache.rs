use anyhow::{Result, anyhow};
use chrono::{Datelike, NaiveDate};
use moka::future::Cache;
use once_cell::sync::OnceCell;
use sqlx::MySqlPool;
use std::sync::Arc;
use std::time::Duration;

use crate::db::fetch_holidays;
use crate::model::holiday::HolidayRecord;

type Window = (NaiveDate, NaiveDate);

const DEFAULT_TTL_SECS: u64 = 3600;

/// Holidays per queried window. Reference data, rarely written.
static HOLIDAY_CACHE: OnceCell<Cache<Window, Arc<Vec<HolidayRecord>>>> = OnceCell::new();

fn build(ttl_secs: u64) -> Cache<Window, Arc<Vec<HolidayRecord>>> {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(ttl_secs))
        .build()
}

fn cache() -> &'static Cache<Window, Arc<Vec<HolidayRecord>>> {
    HOLIDAY_CACHE.get_or_init(|| build(DEFAULT_TTL_SECS))
}

/// Set the TTL. Only effective before the first lookup.
pub fn init(ttl_secs: u64) {
    if HOLIDAY_CACHE.set(build(ttl_secs)).is_err() {
        log::warn!("Holiday cache already initialised, keeping existing TTL");
    }
}

/// Holidays in `from..=to`, from cache or the database.
pub async fn holidays_between(
    pool: &MySqlPool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Arc<Vec<HolidayRecord>>> {
    cache()
        .try_get_with((from, to), async {
            fetch_holidays(pool, from, to).await.map(Arc::new)
        })
        .await
        .map_err(|e| anyhow!("holiday fetch failed: {}", e))
}

/// Drop every cached window, e.g. after a holiday was added.
pub fn invalidate() {
    cache().invalidate_all();
}

/// Preload the holidays of the year containing `today`.
pub async fn warmup_holiday_cache(pool: &MySqlPool, today: NaiveDate) -> Result<()> {
    let (from, to) = year_window(today);
    let holidays = holidays_between(pool, from, to).await?;

    log::info!(
        "Holiday cache warmup complete: {} holidays in {}",
        holidays.len(),
        today.year()
    );
    Ok(())
}

fn year_window(day: NaiveDate) -> Window {
    let year = day.year();
    (
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(day),
        NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(day),
    )
}
