//! Key schema for the news board store
//!
//! Layout:
//! - `news:{id}` → item hash
//! - `news.top` → sorted set, member id, score rank
//! - `news.cron` → sorted set, member id, score creation time
//! - `user.posted:{user_id}` → sorted set, member id, score creation time
//! - `user.saved:{user_id}` → sorted set, member id, score save time
//! - `news.count` / `users.count` → string counters

use crate::{ItemId, UserId};
use std::cmp::Ordering;
use std::fmt;

/// Highest item id assigned so far.
pub const NEWS_COUNTER: &str = "news.count";

/// Number of registered users.
pub const USERS_COUNTER: &str = "users.count";

/// Key builder
pub struct NewsKey;

impl NewsKey {
    /// Format: news:{id}
    pub fn item(id: ItemId) -> String {
        format!("news:{}", id)
    }

    /// Format: news.top
    pub fn top() -> String {
        "news.top".to_string()
    }

    /// Format: news.cron
    pub fn creation() -> String {
        "news.cron".to_string()
    }

    /// Format: user.posted:{user_id}
    pub fn posted_by(user_id: UserId) -> String {
        format!("user.posted:{}", user_id)
    }

    /// Format: user.saved:{user_id}
    pub fn saved_by(user_id: UserId) -> String {
        format!("user.saved:{}", user_id)
    }
}

/// The sorted indices maintained for items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortedIndex {
    /// Keyed by rank; backs the "top" view.
    Top,
    /// Keyed by creation time; append-only.
    Creation,
    /// Items submitted by a user, keyed by creation time.
    PostedBy(UserId),
    /// Items saved by a user, keyed by save time.
    SavedBy(UserId),
}

impl SortedIndex {
    pub fn key(&self) -> String {
        match self {
            SortedIndex::Top => NewsKey::top(),
            SortedIndex::Creation => NewsKey::creation(),
            SortedIndex::PostedBy(user_id) => NewsKey::posted_by(*user_id),
            SortedIndex::SavedBy(user_id) => NewsKey::saved_by(*user_id),
        }
    }
}

impl fmt::Display for SortedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Direction of a sorted index range query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOrder {
    /// Lowest key first.
    Ascending,
    /// Highest key first.
    Descending,
}

/// Sorted index key with the item id as tie breaker, giving a total order.
#[derive(Debug, Clone, Copy)]
pub struct OrderKey {
    pub key: f64,
    pub id: ItemId,
}

impl OrderKey {
    pub fn new(key: f64, id: ItemId) -> Self {
        Self { key, id }
    }
}

impl PartialEq for OrderKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderKey {}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.total_cmp(&other.key).then(self.id.cmp(&other.id))
    }
}
