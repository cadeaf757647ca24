//! Redis-backed store
//!
//! Uses the board's existing key layout (see `keys`). Range reads run
//! `ZRANGE`/`ZREVRANGE` and `ZCARD` in one MULTI block so the reported total
//! matches the page it came with.
//!
//! Redis orders equal scores by member string ("9" before "10"). Each page is
//! re-sorted by `OrderKey` so ties fall back to the item id, as in the
//! in-memory store. A run of equal keys that straddles a page boundary is
//! still split where Redis split it.

use crate::{
    IndexStore, Item, ItemId, NewsKey, OrderKey, RangeOrder, RankFields, SortedIndex,
    StoreError, StoreResult, VoteSource,
};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Shared Redis connection manager
pub type SharedRedis = Arc<Mutex<ConnectionManager>>;

/// Writes score and rank only if the item hash still exists.
const PUT_RANK_FIELDS_SCRIPT: &str = r#"
    if redis.call('EXISTS', KEYS[1]) == 0 then
        return 0
    end
    redis.call('HSET', KEYS[1], 'score', ARGV[1], 'rank', ARGV[2])
    return 1
"#;

/// Open a managed connection to `redis_url`.
pub async fn connect(redis_url: &str) -> StoreResult<SharedRedis> {
    let client = Client::open(redis_url)?;
    let manager = ConnectionManager::new(client).await.map_err(|e| {
        warn!(error = %e, "Failed to initialize Redis connection manager");
        StoreError::Unavailable(format!("Redis connection failed: {}", e))
    })?;

    info!("Redis connection manager initialized");
    Ok(Arc::new(Mutex::new(manager)))
}

#[derive(Clone)]
pub struct RedisIndexStore {
    redis: SharedRedis,
}

impl RedisIndexStore {
    pub fn new(redis: SharedRedis) -> Self {
        Self { redis }
    }

    async fn conn(&self) -> ConnectionManager {
        self.redis.lock().await.clone()
    }
}

/// `ZRANGE` stop index for a window of `count` starting at `start`.
fn range_stop(start: u64, count: u64) -> isize {
    (start + count - 1) as isize
}

/// `used_memory_human` from an `INFO memory` reply.
fn used_memory_human(info: &str) -> Option<String> {
    info.lines()
        .find_map(|line| line.strip_prefix("used_memory_human:"))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Put a `WITHSCORES` page into id tie-break order.
fn order_page(mut entries: Vec<(ItemId, f64)>, order: RangeOrder) -> Vec<ItemId> {
    let key = |(id, score): &(ItemId, f64)| OrderKey::new(*score, *id);
    match order {
        RangeOrder::Ascending => entries.sort_by(|a, b| key(a).cmp(&key(b))),
        RangeOrder::Descending => entries.sort_by(|a, b| key(b).cmp(&key(a))),
    }
    entries.into_iter().map(|(id, _)| id).collect()
}

#[async_trait]
impl IndexStore for RedisIndexStore {
    async fn get_item(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let mut conn = self.conn().await;
        let fields: HashMap<String, String> = conn.hgetall(NewsKey::item(id)).await?;
        Item::from_fields(&fields)
    }

    async fn get_items(&self, ids: &[ItemId]) -> StoreResult<Vec<Option<Item>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for id in ids {
            pipe.hgetall(NewsKey::item(*id));
        }

        let mut conn = self.conn().await;
        let rows: Vec<HashMap<String, String>> = pipe.query_async(&mut conn).await?;

        debug!(count = ids.len(), "Pipelined item fetch");
        rows.iter().map(Item::from_fields).collect()
    }

    async fn put_item_fields(&self, id: ItemId, fields: RankFields) -> StoreResult<()> {
        let mut conn = self.conn().await;
        let written: i64 = redis::Script::new(PUT_RANK_FIELDS_SCRIPT)
            .key(NewsKey::item(id))
            .arg(fields.score)
            .arg(fields.rank)
            .invoke_async(&mut conn)
            .await?;

        if written == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn sorted_index_upsert(
        &self,
        index: SortedIndex,
        id: ItemId,
        key: f64,
    ) -> StoreResult<()> {
        let mut conn = self.conn().await;
        conn.zadd::<_, _, _, ()>(index.key(), id, key).await?;
        Ok(())
    }

    async fn sorted_index_range(
        &self,
        index: SortedIndex,
        start: u64,
        count: u64,
        order: RangeOrder,
    ) -> StoreResult<(Vec<ItemId>, u64)> {
        let key = index.key();
        let mut conn = self.conn().await;

        if count == 0 {
            let total: u64 = conn.zcard(&key).await?;
            return Ok((Vec::new(), total));
        }

        let stop = range_stop(start, count);
        let mut pipe = redis::pipe();
        pipe.atomic();
        match order {
            RangeOrder::Ascending => pipe.zrange_withscores(&key, start as isize, stop),
            RangeOrder::Descending => pipe.zrevrange_withscores(&key, start as isize, stop),
        };
        pipe.zcard(&key);

        let (entries, total): (Vec<(ItemId, f64)>, u64) = pipe.query_async(&mut conn).await?;
        let ids = order_page(entries, order);
        debug!(index = %index, start, count, returned = ids.len(), total, "Sorted index range");
        Ok((ids, total))
    }

    async fn sorted_index_len(&self, index: SortedIndex) -> StoreResult<u64> {
        let mut conn = self.conn().await;
        let total: u64 = conn.zcard(index.key()).await?;
        Ok(total)
    }

    async fn counter_get(&self, name: &str) -> StoreResult<i64> {
        let mut conn = self.conn().await;
        let value: Option<i64> = conn.get(name).await?;
        Ok(value.unwrap_or(0))
    }

    async fn existence_check(&self, id: ItemId) -> StoreResult<bool> {
        let mut conn = self.conn().await;
        let exists: bool = conn.exists(NewsKey::item(id)).await?;
        Ok(exists)
    }

    async fn memory_used(&self) -> StoreResult<Option<String>> {
        let mut conn = self.conn().await;
        let info: String = redis::cmd("INFO")
            .arg("memory")
            .query_async(&mut conn)
            .await?;
        Ok(used_memory_human(&info))
    }
}

/// Reads the `up`/`down` totals the voting subsystem keeps on the item hash.
#[derive(Clone)]
pub struct RedisVoteSource {
    redis: SharedRedis,
}

impl RedisVoteSource {
    pub fn new(redis: SharedRedis) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl VoteSource for RedisVoteSource {
    async fn get_net_votes(&self, id: ItemId) -> StoreResult<i64> {
        let key = NewsKey::item(id);
        let mut conn = self.redis.lock().await.clone();

        let (up, down): (Option<i64>, Option<i64>) = redis::cmd("HMGET")
            .arg(&key)
            .arg("up")
            .arg("down")
            .query_async(&mut conn)
            .await?;

        if up.is_none() && down.is_none() {
            let exists: bool = conn.exists(&key).await?;
            if !exists {
                return Err(StoreError::NotFound(id));
            }
        }

        Ok(up.unwrap_or(0) - down.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_scores_ordered_by_id() {
        // ZREVRANGE hands back "9" before "10" for equal scores
        let page = vec![(9, 0.0), (10, 0.0), (3, 0.0)];
        assert_eq!(order_page(page.clone(), RangeOrder::Descending), vec![10, 9, 3]);
        assert_eq!(order_page(page, RangeOrder::Ascending), vec![3, 9, 10]);
    }

    #[test]
    fn test_page_order_keeps_score_order() {
        let page = vec![(2, 7.5), (11, 1.0), (4, 1.0), (1, 0.0)];
        assert_eq!(order_page(page, RangeOrder::Descending), vec![2, 11, 4, 1]);
    }

    #[test]
    fn test_used_memory_human_parsed_from_info() {
        let info = "# Memory\r\nused_memory:1030352\r\nused_memory_human:1006.20K\r\n\
                    used_memory_rss:7299072\r\n";
        assert_eq!(used_memory_human(info), Some("1006.20K".to_string()));
        assert_eq!(used_memory_human("# Memory\r\nused_memory:10\r\n"), None);
    }

    #[test]
    fn test_range_stop_is_inclusive() {
        assert_eq!(range_stop(0, 10), 9);
        assert_eq!(range_stop(20, 10), 29);
        assert_eq!(range_stop(5, 1), 5);
    }
}
