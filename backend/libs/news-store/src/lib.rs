//! News board storage layer
//!
//! Provides the collaborators the ranking engine reads and writes through:
//! - `IndexStore`: item records, sorted indices (rank, creation time, per-user)
//!   and counters
//! - `VoteSource`: net vote totals per item, owned by the voting subsystem
//!
//! Two implementations are shipped: Redis (production, compatible with the
//! board's existing key layout) and in-memory (tests and local tooling).

mod error;
mod item;
mod keys;
mod memory;
mod redis_store;
mod store;

/// Positive, monotonically assigned item identifier.
pub type ItemId = u64;

/// User identifier as assigned by the account subsystem.
pub type UserId = u64;

pub use error::{StoreError, StoreResult};
pub use item::{Item, RankFields};
pub use keys::{NewsKey, OrderKey, RangeOrder, SortedIndex, NEWS_COUNTER, USERS_COUNTER};
pub use memory::MemoryIndexStore;
pub use redis_store::{connect, RedisIndexStore, RedisVoteSource, SharedRedis};
pub use store::{IndexStore, VoteSource};
