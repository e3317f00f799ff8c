//! Time and duration utilities
//!
//! Pure helpers over epoch-millisecond timestamps: calendar-aware duration
//! addition, display formatting, and human-readable duration strings.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, Months, TimeZone, Utc};

/// Units supported by [`add_duration`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Quarters,
    Years,
}

impl TimeUnit {
    /// Singular unit name used when building duration strings
    pub fn label(self) -> &'static str {
        match self {
            TimeUnit::Milliseconds => "millisecond",
            TimeUnit::Seconds => "second",
            TimeUnit::Minutes => "minute",
            TimeUnit::Hours => "hour",
            TimeUnit::Days => "day",
            TimeUnit::Weeks => "week",
            TimeUnit::Months => "month",
            TimeUnit::Quarters => "quarter",
            TimeUnit::Years => "year",
        }
    }

    /// Plural unit name as presented to the user in the intake wizard
    pub fn choice_label(self) -> &'static str {
        match self {
            TimeUnit::Milliseconds => "milliseconds",
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
            TimeUnit::Weeks => "weeks",
            TimeUnit::Months => "months",
            TimeUnit::Quarters => "quarters",
            TimeUnit::Years => "years",
        }
    }

    /// Parse a wizard choice back into a unit
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice {
            "milliseconds" => Some(TimeUnit::Milliseconds),
            "seconds" => Some(TimeUnit::Seconds),
            "minutes" => Some(TimeUnit::Minutes),
            "hours" => Some(TimeUnit::Hours),
            "days" => Some(TimeUnit::Days),
            "weeks" => Some(TimeUnit::Weeks),
            "months" => Some(TimeUnit::Months),
            "quarters" => Some(TimeUnit::Quarters),
            "years" => Some(TimeUnit::Years),
            _ => None,
        }
    }
}

/// Add a calendar-aware duration to an epoch-millisecond timestamp.
///
/// Month-based units clamp to the last valid day of the target month
/// (Jan 31 + 1 month = Feb 28 or 29). Returns `base_ms` unchanged when the
/// result would overflow the supported chrono range.
pub fn add_duration(base_ms: i64, unit: TimeUnit, amount: i64) -> i64 {
    let Some(base) = to_datetime(base_ms) else {
        return base_ms;
    };
    let added = match unit {
        TimeUnit::Milliseconds => base.checked_add_signed(Duration::milliseconds(amount)),
        TimeUnit::Seconds => base.checked_add_signed(Duration::seconds(amount)),
        TimeUnit::Minutes => base.checked_add_signed(Duration::minutes(amount)),
        TimeUnit::Hours => base.checked_add_signed(Duration::hours(amount)),
        TimeUnit::Days => base.checked_add_signed(Duration::days(amount)),
        TimeUnit::Weeks => base.checked_add_signed(Duration::weeks(amount)),
        TimeUnit::Months => add_months(base, amount),
        TimeUnit::Quarters => amount.checked_mul(3).and_then(|m| add_months(base, m)),
        TimeUnit::Years => amount.checked_mul(12).and_then(|m| add_months(base, m)),
    };
    added.map(|dt| dt.timestamp_millis()).unwrap_or(base_ms)
}

fn add_months(base: DateTime<Utc>, amount: i64) -> Option<DateTime<Utc>> {
    let months = u32::try_from(amount.unsigned_abs()).ok().map(Months::new)?;
    if amount >= 0 {
        base.checked_add_months(months)
    } else {
        base.checked_sub_months(months)
    }
}

/// Format a timestamp with a strftime pattern.
///
/// Used inside notification text, so a bad pattern degrades to an RFC 3339
/// rendering (and an out-of-range timestamp to its raw millisecond value)
/// instead of panicking.
pub fn format_for_display(ts_ms: i64, pattern: &str) -> String {
    let Some(dt) = to_datetime(ts_ms) else {
        return ts_ms.to_string();
    };
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        tracing::warn!("Invalid date format pattern {:?}", pattern);
        return dt.to_rfc3339();
    }
    dt.format_with_items(items.into_iter()).to_string()
}

/// Human-readable duration, e.g. `"1 minute"` or `"5 minutes"`.
///
/// Singular exactly when `amount == 1`, otherwise the unit name gets an `s`.
pub fn duration_to_words(amount: i64, unit: TimeUnit) -> String {
    if amount == 1 {
        format!("1 {}", unit.label())
    } else {
        format!("{} {}s", amount, unit.label())
    }
}

/// Compact remaining-time string for the sidebar list, e.g. `"1d 2h 3m 4s"`.
/// Empty when the reminder is not in the future.
pub fn countdown_words(remaining_ms: i64) -> String {
    if remaining_ms <= 0 {
        return String::new();
    }
    let total_secs = remaining_ms / 1000;
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{}d ", days));
    }
    if hours > 0 {
        out.push_str(&format!("{}h ", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}m ", minutes));
    }
    if seconds > 0 {
        out.push_str(&format!("{}s", seconds));
    }
    out.trim_end().to_string()
}

fn to_datetime(ts_ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ts_ms).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ms(year: i32, month: u32, day: u32, hour: u32, min: u32) -> i64 {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis()
    }

    #[test]
    fn test_add_fixed_units() {
        let base = ms(2024, 3, 15, 10, 0);
        assert_eq!(add_duration(base, TimeUnit::Milliseconds, 250), base + 250);
        assert_eq!(add_duration(base, TimeUnit::Seconds, 5), base + 5_000);
        assert_eq!(add_duration(base, TimeUnit::Minutes, 2), base + 120_000);
        assert_eq!(add_duration(base, TimeUnit::Hours, 1), base + 3_600_000);
        assert_eq!(add_duration(base, TimeUnit::Days, 1), base + 86_400_000);
        assert_eq!(add_duration(base, TimeUnit::Weeks, 1), base + 7 * 86_400_000);
    }

    #[test]
    fn test_add_month_clamps_to_end_of_february() {
        // Jan 31 + 1 month must not overflow into March
        let base = ms(2023, 1, 31, 9, 30);
        assert_eq!(add_duration(base, TimeUnit::Months, 1), ms(2023, 2, 28, 9, 30));
    }

    #[test]
    fn test_add_month_respects_leap_year() {
        let base = ms(2024, 1, 31, 9, 30);
        assert_eq!(add_duration(base, TimeUnit::Months, 1), ms(2024, 2, 29, 9, 30));
    }

    #[test]
    fn test_add_quarters_and_years() {
        let base = ms(2024, 2, 29, 12, 0);
        assert_eq!(add_duration(base, TimeUnit::Quarters, 1), ms(2024, 5, 29, 12, 0));
        // Feb 29 + 1 year clamps to Feb 28
        assert_eq!(add_duration(base, TimeUnit::Years, 1), ms(2025, 2, 28, 12, 0));
    }

    #[test]
    fn test_add_negative_months() {
        let base = ms(2024, 3, 31, 8, 0);
        assert_eq!(add_duration(base, TimeUnit::Months, -1), ms(2024, 2, 29, 8, 0));
    }

    #[test]
    fn test_format_for_display() {
        let base = ms(2024, 3, 15, 14, 5);
        assert_eq!(
            format_for_display(base, "%Y-%m-%d %I:%M %p"),
            "2024-03-15 02:05 PM"
        );
    }

    #[test]
    fn test_format_bad_pattern_falls_back() {
        let base = ms(2024, 3, 15, 14, 5);
        // Trailing percent is an invalid strftime item
        let formatted = format_for_display(base, "due at %");
        assert!(formatted.starts_with("2024-03-15"));
    }

    #[test]
    fn test_duration_to_words_pluralization() {
        assert_eq!(duration_to_words(1, TimeUnit::Minutes), "1 minute");
        assert_eq!(duration_to_words(5, TimeUnit::Minutes), "5 minutes");
        assert_eq!(duration_to_words(2, TimeUnit::Quarters), "2 quarters");
        assert_eq!(duration_to_words(1, TimeUnit::Years), "1 year");
    }

    #[test]
    fn test_countdown_words() {
        assert_eq!(countdown_words(-5), "");
        assert_eq!(countdown_words(0), "");
        assert_eq!(countdown_words(4_000), "4s");
        assert_eq!(countdown_words(62_000), "1m 2s");
        let day_plus = 86_400_000 + 2 * 3_600_000 + 3 * 60_000 + 4_000;
        assert_eq!(countdown_words(day_plus), "1d 2h 3m 4s");
        // Zero components are skipped
        assert_eq!(countdown_words(3_600_000), "1h");
    }

    #[test]
    fn test_unit_choice_round_trip() {
        for unit in [
            TimeUnit::Minutes,
            TimeUnit::Hours,
            TimeUnit::Days,
            TimeUnit::Weeks,
            TimeUnit::Months,
            TimeUnit::Quarters,
            TimeUnit::Years,
        ] {
            assert_eq!(TimeUnit::from_choice(unit.choice_label()), Some(unit));
        }
        assert_eq!(TimeUnit::from_choice("fortnights"), None);
    }
}
