use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

const MS_PER_DAY: i64 = 86_400_000;

/// Get the last day of a given month.
pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap() - Duration::days(1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap() - Duration::days(1)
    }
}

/// First instant of the given day, UTC.
pub fn day_start(d: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN))
}

/// Last represented instant of the given day (23:59:59.999), UTC.
pub fn day_end(d: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&d.and_time(NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap()))
}

/// Whole days from `now` until midnight UTC at the start of `date`,
/// rounded up. Today's deadline observed mid-day comes back as 0,
/// yesterday's as a negative count.
pub fn days_until(date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let ms = (day_start(date) - now).num_milliseconds();
    // Ceiling division; i64::div_ceil is unstable (int_roundings).
    ms.div_euclid(MS_PER_DAY) + (ms.rem_euclid(MS_PER_DAY) != 0) as i64
}

/// Signed fractional days elapsed from `earlier` to `later`.
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / MS_PER_DAY as f64
}

/// Strip markdown code fences from LLM responses.
pub fn strip_code_fences(s: &str) -> &str {
    let s = s.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        rest.strip_suffix("```").unwrap_or(rest).trim()
    } else if let Some(rest) = s.strip_prefix("```") {
        rest.strip_suffix("```").unwrap_or(rest).trim()
    } else {
        s
    }
}
