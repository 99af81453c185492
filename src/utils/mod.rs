pub mod datetime;
pub mod holiday_cache;
