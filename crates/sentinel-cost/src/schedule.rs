//! Task schedule parsing
//!
//! Tasks declare schedules like `"5 MINUTE"`, `"1 HOUR"` or `"2 DAY"`.
//! Anything unparseable falls back to one run per day, the platform's
//! effective default for ad-hoc tasks.

use once_cell::sync::Lazy;
use regex::Regex;

/// Fallback when the schedule string cannot be interpreted
pub const DEFAULT_EXECUTIONS_PER_YEAR: u64 = 365;

static SCHEDULE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(minute|hour|day)s?").expect("schedule regex is valid")
});

/// Derive annual execution count from a schedule string
#[must_use]
pub fn executions_per_year(schedule: &str) -> u64 {
    let Some(caps) = SCHEDULE_RE.captures(schedule) else {
        tracing::debug!(schedule, "unparseable schedule, assuming daily");
        return DEFAULT_EXECUTIONS_PER_YEAR;
    };
    let Ok(interval) = caps[1].parse::<u64>() else {
        return DEFAULT_EXECUTIONS_PER_YEAR;
    };
    if interval == 0 {
        return DEFAULT_EXECUTIONS_PER_YEAR;
    }
    match caps[2].to_lowercase().as_str() {
        "minute" => 365 * 24 * 60 / interval,
        "hour" => 365 * 24 / interval,
        "day" => 365 / interval,
        _ => DEFAULT_EXECUTIONS_PER_YEAR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_minute_schedule() {
        assert_eq!(executions_per_year("5 MINUTE"), 105_120);
    }

    #[test]
    fn hourly_and_daily_schedules() {
        assert_eq!(executions_per_year("1 HOUR"), 8760);
        assert_eq!(executions_per_year("12 hours"), 730);
        assert_eq!(executions_per_year("1 DAY"), 365);
        assert_eq!(executions_per_year("7 day"), 52);
    }

    #[test]
    fn unparseable_defaults_to_daily() {
        assert_eq!(executions_per_year("whenever"), 365);
        assert_eq!(executions_per_year(""), 365);
        assert_eq!(executions_per_year("0 MINUTE"), 365);
    }
}
