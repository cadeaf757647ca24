//! Score & Rank Module
//!
//! Pure functions deriving an item's popularity score and its "hot" ordering
//! key. The recompute job and any on-write updater call the same functions,
//! so identical inputs always reproduce identical `{score, rank}`.
//!
//! # Formulas
//! - `score = max(net_votes, 0) * 2^(-age_hours / SCORE_HALF_LIFE_HOURS)`
//! - `rank  = score * RANK_SCALE / (age_hours + RANK_AGE_PADDING_HOURS)^RANK_GRAVITY`
//!
//! Score decays with a 48h half-life; rank adds a polynomial age penalty on
//! top so that old items leave the front page without new votes.

use crate::utils::{age_hours, exponential_decay};
use news_store::RankFields;

pub const SCORE_HALF_LIFE_HOURS: f64 = 48.0;
pub const RANK_AGE_PADDING_HOURS: f64 = 2.0;
pub const RANK_GRAVITY: f64 = 1.8;
pub const RANK_SCALE: f64 = 1000.0;

/// Popularity of an item with `net_votes` that is `age_secs` old.
///
/// Non-negative; non-decreasing in votes, non-increasing in age.
pub fn score(net_votes: i64, age_secs: i64) -> f64 {
    let votes = net_votes.max(0) as f64;
    votes * exponential_decay(age_hours(age_secs), SCORE_HALF_LIFE_HOURS)
}

/// Ordering key for the "top" view; sort descending.
pub fn rank(score: f64, age_secs: i64) -> f64 {
    let penalty = (age_hours(age_secs) + RANK_AGE_PADDING_HOURS).powf(RANK_GRAVITY);
    score.max(0.0) * RANK_SCALE / penalty
}

/// Both derived fields for one item.
pub fn rank_fields(net_votes: i64, age_secs: i64) -> RankFields {
    let score = score(net_votes, age_secs);
    RankFields {
        score,
        rank: rank(score, age_secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 3600;

    #[test]
    fn test_score_monotonic_in_votes() {
        for age in [0, HOUR, 24 * HOUR, 30 * 24 * HOUR] {
            let mut previous = score(0, age);
            for votes in 1..200 {
                let current = score(votes, age);
                assert!(current >= previous, "votes={} age={}", votes, age);
                previous = current;
            }
        }
    }

    #[test]
    fn test_score_monotonic_in_age() {
        for votes in [0, 1, 10, 500] {
            let mut previous = score(votes, 0);
            for hours in 1..500 {
                let current = score(votes, hours * HOUR);
                assert!(current <= previous, "votes={} hours={}", votes, hours);
                previous = current;
            }
        }
    }

    #[test]
    fn test_score_non_negative() {
        assert_eq!(score(-15, 0), 0.0);
        assert!(score(3, 10 * 365 * 24 * HOUR) >= 0.0);
    }

    #[test]
    fn test_score_half_life() {
        let fresh = score(10, 0);
        let aged = score(10, 48 * HOUR);
        assert!((aged - fresh / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_rank_penalises_age() {
        // Same score, older item ranks lower.
        assert!(rank(5.0, HOUR) > rank(5.0, 10 * HOUR));
        // A stale high scorer eventually drops under a fresh modest one.
        let old = rank_fields(100, 14 * 24 * HOUR);
        let fresh = rank_fields(3, HOUR);
        assert!(fresh.rank > old.rank);
    }

    #[test]
    fn test_rank_fields_deterministic() {
        assert_eq!(rank_fields(7, 5 * HOUR), rank_fields(7, 5 * HOUR));
    }
}
