// Utility functions for ranking-service

use chrono::Utc;

pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Source of the current time, in unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A clock stopped at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// Compute exponential decay for time-based scoring
pub fn exponential_decay(age_hours: f64, half_life_hours: f64) -> f64 {
    (-age_hours / half_life_hours * std::f64::consts::LN_2).exp()
}

/// Hours elapsed for an age in seconds; negative ages count as zero.
pub fn age_hours(age_secs: i64) -> f64 {
    age_secs.max(0) as f64 / SECONDS_PER_HOUR
}

/// Human readable age, e.g. "3 hours ago".
pub fn elapsed_label(then: i64, now: i64) -> String {
    let seconds = now - then;
    if seconds <= 1 {
        return "now".to_string();
    }

    const UNITS: [(i64, &str); 4] = [(86400, "day"), (3600, "hour"), (60, "minute"), (1, "second")];
    let (length, label) = UNITS
        .iter()
        .copied()
        .find(|(length, _)| seconds >= *length)
        .unwrap_or((1, "second"));

    let units = seconds / length;
    format!("{} {}{} ago", units, label, if units > 1 { "s" } else { "" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_decay_halves_every_48_hours() {
        assert!((exponential_decay(0.0, 48.0) - 1.0).abs() < 1e-12);
        assert!((exponential_decay(48.0, 48.0) - 0.5).abs() < 1e-12);
        assert!((exponential_decay(96.0, 48.0) - 0.25).abs() < 1e-12);

        // 一天只剩約 70.7%
        let one_day = exponential_decay(24.0, 48.0);
        assert!((one_day - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_age_hours_clamps_negative() {
        assert_eq!(age_hours(-60), 0.0);
        assert_eq!(age_hours(7200), 2.0);
    }

    #[test]
    fn test_elapsed_label() {
        assert_eq!(elapsed_label(100, 100), "now");
        assert_eq!(elapsed_label(100, 101), "now");
        assert_eq!(elapsed_label(0, 30), "30 seconds ago");
        assert_eq!(elapsed_label(0, 60), "1 minute ago");
        assert_eq!(elapsed_label(0, 3 * 3600 + 59), "3 hours ago");
        assert_eq!(elapsed_label(0, 2 * 86400), "2 days ago");
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock(1_700_000_000).now(), 1_700_000_000);
        assert!(SystemClock.now() > 1_600_000_000);
    }
}
