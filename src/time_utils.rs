// SPDX-License-Identifier: MIT
// Copyright 2026 Fabula Authors

//! Shared helpers for date/time handling.

use chrono::{DateTime, Duration, NaiveTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Cutoff separating "current" from "past" events: the midnight before
/// yesterday's midnight, i.e. `midnight(now) - 1 day`. Events starting at
/// or after the cutoff are still presented as current.
pub fn history_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    midnight - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn cutoff_is_start_of_previous_day() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 15, 30, 0).unwrap();
        let cutoff = history_cutoff(now);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap());
    }

    #[test]
    fn cutoff_at_exact_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
        let cutoff = history_cutoff(now);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap());
    }
}
