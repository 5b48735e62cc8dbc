//! Billing period resolution.
//!
//! A billing period is the inclusive calendar-month range used to scope a
//! bill query. Month lengths are derived with calendar arithmetic: jump to
//! day 28, add four days (always past the end of the month), truncate to the
//! first of the resulting month and step back one day.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::error::BillingError;

/// Format used by the billing API for period boundaries.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Inclusive date-time range covering one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingPeriod {
    /// Month label (`YYYY-MM`).
    pub month: String,
    /// First day of the month at 00:00:00.
    pub begin: NaiveDateTime,
    /// Last day of the month at 23:59:59.
    pub end: NaiveDateTime,
}

impl BillingPeriod {
    /// Resolve a `YYYY-MM` label into its billing period.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::Parse`] if the label is not exactly `YYYY-MM`
    /// or names a month outside 01..=12.
    pub fn from_month(label: &str) -> Result<Self, BillingError> {
        let first_day = parse_month_label(label)?;
        let parse_error = || BillingError::Parse {
            label: label.to_string(),
        };

        let next_month = first_day
            .with_day(28)
            .and_then(|day| day.checked_add_signed(Duration::days(4)))
            .and_then(|day| day.with_day(1))
            .ok_or_else(parse_error)?;
        let last_day = next_month.pred_opt().ok_or_else(parse_error)?;
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).ok_or_else(parse_error)?;

        Ok(Self {
            month: label.to_string(),
            begin: first_day.and_time(NaiveTime::MIN),
            end: last_day.and_time(end_of_day),
        })
    }

    /// Label of the calendar month before `today` (e.g. `2025-09` on any day of October 2025).
    #[must_use]
    pub fn previous_month(today: NaiveDate) -> String {
        let first_of_month = today.with_day(1).unwrap_or(today);
        first_of_month
            .pred_opt()
            .unwrap_or(first_of_month)
            .format("%Y-%m")
            .to_string()
    }

    /// Period start formatted as `YYYY-MM-DD 00:00:00`.
    #[must_use]
    pub fn begin_time(&self) -> String {
        self.begin.format(DATETIME_FORMAT).to_string()
    }

    /// Period end formatted as `YYYY-MM-DD 23:59:59`.
    #[must_use]
    pub fn end_time(&self) -> String {
        self.end.format(DATETIME_FORMAT).to_string()
    }

    /// Both boundaries as formatted strings.
    #[must_use]
    pub fn bounds(&self) -> (String, String) {
        (self.begin_time(), self.end_time())
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ~ {}", self.begin_time(), self.end_time())
    }
}

/// Parse a strict `YYYY-MM` label into the first day of that month.
fn parse_month_label(label: &str) -> Result<NaiveDate, BillingError> {
    let parse_error = || BillingError::Parse {
        label: label.to_string(),
    };

    let bytes = label.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return Err(parse_error());
    }
    let (year, month) = (&label[..4], &label[5..]);
    if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(parse_error());
    }

    let year: i32 = year.parse().map_err(|_| parse_error())?;
    let month: u32 = month.parse().map_err(|_| parse_error())?;
    if year < 1 {
        return Err(parse_error());
    }

    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(parse_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(label: &str) -> (String, String) {
        BillingPeriod::from_month(label).unwrap().bounds()
    }

    #[test]
    fn test_thirty_day_month() {
        assert_eq!(
            bounds("2025-09"),
            (
                "2025-09-01 00:00:00".to_string(),
                "2025-09-30 23:59:59".to_string()
            )
        );
    }

    #[test]
    fn test_february_leap_year() {
        assert_eq!(bounds("2024-02").1, "2024-02-29 23:59:59");
    }

    #[test]
    fn test_february_common_year() {
        assert_eq!(bounds("2023-02").1, "2023-02-28 23:59:59");
        assert_eq!(bounds("1900-02").1, "1900-02-28 23:59:59");
        assert_eq!(bounds("2000-02").1, "2000-02-29 23:59:59");
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        assert_eq!(
            bounds("2025-12"),
            (
                "2025-12-01 00:00:00".to_string(),
                "2025-12-31 23:59:59".to_string()
            )
        );
    }

    #[test]
    fn test_every_month_of_a_year() {
        let expected = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        for (index, days) in expected.iter().enumerate() {
            let label = format!("2023-{:02}", index + 1);
            let (begin, end) = bounds(&label);
            assert_eq!(begin, format!("{label}-01 00:00:00"));
            assert_eq!(end, format!("{label}-{days:02} 23:59:59"));
        }
    }

    #[test]
    fn test_invalid_labels() {
        for label in [
            "2025-13", "2025/09", "", "2025-00", "2025-9", "25-09", "2025-09-01", " 2025-09",
            "2025-0a", "abcd-09", "0000-01",
        ] {
            let result = BillingPeriod::from_month(label);
            assert!(
                matches!(result, Err(BillingError::Parse { .. })),
                "expected parse error for {label:?}"
            );
        }
    }

    #[test]
    fn test_resolution_is_idempotent() {
        assert_eq!(
            BillingPeriod::from_month("2024-02").unwrap(),
            BillingPeriod::from_month("2024-02").unwrap()
        );
    }

    #[test]
    fn test_previous_month() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 15).unwrap();
        assert_eq!(BillingPeriod::previous_month(today), "2025-09");

        let new_year = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(BillingPeriod::previous_month(new_year), "2025-12");

        let march = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(BillingPeriod::previous_month(march), "2024-02");
    }

    #[test]
    fn test_display() {
        let period = BillingPeriod::from_month("2023-02").unwrap();
        assert_eq!(
            period.to_string(),
            "2023-02-01 00:00:00 ~ 2023-02-28 23:59:59"
        );
    }
}
