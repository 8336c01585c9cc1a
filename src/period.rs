use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::date_util::last_day_of_month;
use crate::error::{Error, Result};

/// Aggregation window for metrics and analysis runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Weekly,
    Monthly,
}

impl Period {
    /// Parse a period string: `weekly` or `monthly` (case-insensitive).
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            other => Err(Error::PeriodParse(format!("unrecognized period: {other}"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }

    /// Get the inclusive date range containing `reference`.
    ///
    /// Weekly windows run Sunday through Saturday; monthly windows are
    /// calendar months.
    pub fn date_range(&self, reference: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Period::Weekly => {
                let start = reference
                    - Duration::days(reference.weekday().num_days_from_sunday() as i64);
                (start, start + Duration::days(6))
            }
            Period::Monthly => {
                let start =
                    NaiveDate::from_ymd_opt(reference.year(), reference.month(), 1).unwrap();
                (start, last_day_of_month(reference.year(), reference.month()))
            }
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse() {
        assert_eq!(Period::parse("weekly").unwrap(), Period::Weekly);
        assert_eq!(Period::parse("monthly").unwrap(), Period::Monthly);
        assert_eq!(Period::parse(" Weekly ").unwrap(), Period::Weekly);
        assert_eq!(Period::parse("MONTHLY").unwrap(), Period::Monthly);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Period::parse("quarterly").is_err());
        assert!(Period::parse("").is_err());
    }

    #[test]
    fn test_weekly_range_starts_sunday() {
        // 2025-03-12 is a Wednesday; its week is Mar 9 (Sun) through Mar 15 (Sat).
        let (start, end) = Period::Weekly.date_range(date(2025, 3, 12));
        assert_eq!(start, date(2025, 3, 9));
        assert_eq!(end, date(2025, 3, 15));
        assert_eq!(start.weekday(), chrono::Weekday::Sun);
        assert_eq!(end.weekday(), chrono::Weekday::Sat);
    }

    #[test]
    fn test_weekly_range_on_sunday() {
        // 2025-06-01 is itself a Sunday.
        let (start, end) = Period::Weekly.date_range(date(2025, 6, 1));
        assert_eq!(start, date(2025, 6, 1));
        assert_eq!(end, date(2025, 6, 7));
    }

    #[test]
    fn test_weekly_range_crosses_month() {
        // 2025-04-01 is a Tuesday; the window reaches back into March.
        let (start, end) = Period::Weekly.date_range(date(2025, 4, 1));
        assert_eq!(start, date(2025, 3, 30));
        assert_eq!(end, date(2025, 4, 5));
    }

    #[test]
    fn test_monthly_range() {
        let (start, end) = Period::Monthly.date_range(date(2025, 2, 14));
        assert_eq!(start, date(2025, 2, 1));
        assert_eq!(end, date(2025, 2, 28));

        let (start, end) = Period::Monthly.date_range(date(2024, 2, 10));
        assert_eq!(start, date(2024, 2, 1));
        assert_eq!(end, date(2024, 2, 29)); // Leap year

        let (start, end) = Period::Monthly.date_range(date(2025, 12, 31));
        assert_eq!(start, date(2025, 12, 1));
        assert_eq!(end, date(2025, 12, 31));
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(Period::Weekly.to_string(), "weekly");
        assert_eq!(Period::Monthly.to_string(), "monthly");
        assert_eq!(serde_json::to_string(&Period::Weekly).unwrap(), "\"weekly\"");
        let p: Period = serde_json::from_str("\"monthly\"").unwrap();
        assert_eq!(p, Period::Monthly);
    }
}
