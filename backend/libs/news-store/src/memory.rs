//! In-memory store
//!
//! Mirrors the Redis layout closely enough for the engine's behaviour to be
//! exercised without a server. Equal keys are ordered by item id.

use crate::{
    IndexStore, Item, ItemId, OrderKey, RangeOrder, RankFields, SortedIndex, StoreError,
    StoreResult, UserId, VoteSource, NEWS_COUNTER,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct MemoryState {
    items: HashMap<ItemId, Item>,
    indices: HashMap<SortedIndex, HashMap<ItemId, f64>>,
    counters: HashMap<String, i64>,
}

#[derive(Default)]
pub struct MemoryIndexStore {
    state: RwLock<MemoryState>,
}

impl MemoryIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly submitted item: record, creation/top/author indices,
    /// and the `news.count` high-water mark.
    pub async fn insert_item(&self, item: Item) -> StoreResult<()> {
        item.validate()?;

        let mut state = self.state.write().await;
        let id = item.id;
        let created_at = item.created_at as f64;

        index_mut(&mut state, SortedIndex::Creation).insert(id, created_at);
        index_mut(&mut state, SortedIndex::Top).insert(id, item.rank);
        index_mut(&mut state, SortedIndex::PostedBy(item.author_id)).insert(id, created_at);

        let counter = state.counters.entry(NEWS_COUNTER.to_string()).or_insert(0);
        *counter = (*counter).max(id as i64);

        state.items.insert(id, item);
        debug!(item_id = id, "Inserted item");
        Ok(())
    }

    /// Record that `user_id` saved `id` at `saved_at`.
    pub async fn save_item(&self, user_id: UserId, id: ItemId, saved_at: i64) {
        let mut state = self.state.write().await;
        index_mut(&mut state, SortedIndex::SavedBy(user_id)).insert(id, saved_at as f64);
    }

    /// Overwrite the persisted vote aggregate of an item.
    pub async fn record_votes(&self, id: ItemId, upvotes: u64, downvotes: u64) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let item = state.items.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        item.upvotes = upvotes;
        item.downvotes = downvotes;
        Ok(())
    }

    /// Flag an item as deleted. The record and its index entries stay.
    pub async fn mark_deleted(&self, id: ItemId) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let item = state.items.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        item.deleted = true;
        Ok(())
    }

    /// Drop the record while leaving dangling index entries behind.
    pub async fn remove_item(&self, id: ItemId) -> Option<Item> {
        self.state.write().await.items.remove(&id)
    }

    pub async fn set_counter(&self, name: &str, value: i64) {
        self.state
            .write()
            .await
            .counters
            .insert(name.to_string(), value);
    }

    /// Current key of `id` in `index`, if present.
    pub async fn index_key(&self, index: SortedIndex, id: ItemId) -> Option<f64> {
        self.state
            .read()
            .await
            .indices
            .get(&index)
            .and_then(|entries| entries.get(&id).copied())
    }
}

fn index_mut(state: &mut MemoryState, index: SortedIndex) -> &mut HashMap<ItemId, f64> {
    state.indices.entry(index).or_default()
}

#[async_trait]
impl IndexStore for MemoryIndexStore {
    async fn get_item(&self, id: ItemId) -> StoreResult<Option<Item>> {
        Ok(self.state.read().await.items.get(&id).cloned())
    }

    async fn put_item_fields(&self, id: ItemId, fields: RankFields) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let item = state.items.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        item.score = fields.score;
        item.rank = fields.rank;
        Ok(())
    }

    async fn sorted_index_upsert(
        &self,
        index: SortedIndex,
        id: ItemId,
        key: f64,
    ) -> StoreResult<()> {
        let mut state = self.state.write().await;
        index_mut(&mut state, index).insert(id, key);
        Ok(())
    }

    async fn sorted_index_range(
        &self,
        index: SortedIndex,
        start: u64,
        count: u64,
        order: RangeOrder,
    ) -> StoreResult<(Vec<ItemId>, u64)> {
        let state = self.state.read().await;
        let Some(entries) = state.indices.get(&index) else {
            return Ok((Vec::new(), 0));
        };

        let mut sorted: Vec<OrderKey> = entries
            .iter()
            .map(|(id, key)| OrderKey::new(*key, *id))
            .collect();
        match order {
            RangeOrder::Ascending => sorted.sort(),
            RangeOrder::Descending => sorted.sort_by(|a, b| b.cmp(a)),
        }

        let total = sorted.len() as u64;
        let ids = sorted
            .into_iter()
            .skip(start as usize)
            .take(count as usize)
            .map(|entry| entry.id)
            .collect();

        Ok((ids, total))
    }

    async fn sorted_index_len(&self, index: SortedIndex) -> StoreResult<u64> {
        let state = self.state.read().await;
        Ok(state.indices.get(&index).map_or(0, |e| e.len() as u64))
    }

    async fn counter_get(&self, name: &str) -> StoreResult<i64> {
        Ok(self
            .state
            .read()
            .await
            .counters
            .get(name)
            .copied()
            .unwrap_or(0))
    }

    async fn existence_check(&self, id: ItemId) -> StoreResult<bool> {
        Ok(self.state.read().await.items.contains_key(&id))
    }
}

/// The vote aggregate lives on the item record, as it does in Redis.
#[async_trait]
impl VoteSource for MemoryIndexStore {
    async fn get_net_votes(&self, id: ItemId) -> StoreResult<i64> {
        let state = self.state.read().await;
        state
            .items
            .get(&id)
            .map(Item::net_votes)
            .ok_or(StoreError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> MemoryIndexStore {
        let store = MemoryIndexStore::new();
        for (id, ctime) in [(1, 100), (2, 300), (3, 200)] {
            store
                .insert_item(Item::new(id, format!("item {}", id), 7, ctime))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_insert_populates_indices_and_counter() {
        let store = seeded().await;
        assert_eq!(store.counter_get(NEWS_COUNTER).await.unwrap(), 3);
        assert_eq!(store.sorted_index_len(SortedIndex::Creation).await.unwrap(), 3);
        assert_eq!(store.sorted_index_len(SortedIndex::PostedBy(7)).await.unwrap(), 3);
        assert_eq!(store.sorted_index_len(SortedIndex::PostedBy(8)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_item() {
        let store = MemoryIndexStore::new();
        let bad = Item::new(1, "x", 1, 0).with_url("https://a.io").with_text("b");
        assert!(store.insert_item(bad).await.is_err());
        assert!(!store.existence_check(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_range_orders() {
        let store = seeded().await;

        let (asc, total) = store
            .sorted_index_range(SortedIndex::Creation, 0, 10, RangeOrder::Ascending)
            .await
            .unwrap();
        assert_eq!(asc, vec![1, 3, 2]);
        assert_eq!(total, 3);

        let (desc, _) = store
            .sorted_index_range(SortedIndex::Creation, 1, 1, RangeOrder::Descending)
            .await
            .unwrap();
        assert_eq!(desc, vec![3]);
    }

    #[tokio::test]
    async fn test_range_ties_broken_by_id() {
        let store = MemoryIndexStore::new();
        for id in [4, 2, 9] {
            store.sorted_index_upsert(SortedIndex::Top, id, 1.0).await.unwrap();
        }
        let (desc, _) = store
            .sorted_index_range(SortedIndex::Top, 0, 10, RangeOrder::Descending)
            .await
            .unwrap();
        assert_eq!(desc, vec![9, 4, 2]);
    }

    #[tokio::test]
    async fn test_range_past_end_reports_total() {
        let store = seeded().await;
        let (ids, total) = store
            .sorted_index_range(SortedIndex::Creation, 10, 5, RangeOrder::Descending)
            .await
            .unwrap();
        assert!(ids.is_empty());
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_put_fields_never_recreates_record() {
        let store = seeded().await;
        store.remove_item(2).await;

        let err = store
            .put_item_fields(2, RankFields { score: 1.0, rank: 1.0 })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!store.existence_check(2).await.unwrap());
        // index entry is left dangling
        assert!(store.index_key(SortedIndex::Creation, 2).await.is_some());
    }

    #[tokio::test]
    async fn test_mark_deleted_keeps_record() {
        let store = seeded().await;
        store.mark_deleted(1).await.unwrap();
        let item = store.get_item(1).await.unwrap().unwrap();
        assert!(item.deleted);
        assert!(store.existence_check(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_votes_read_from_record() {
        let store = seeded().await;
        store.record_votes(3, 12, 5).await.unwrap();
        assert_eq!(store.get_net_votes(3).await.unwrap(), 7);
        assert!(store.get_net_votes(42).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_unknown_counter_reads_zero() {
        let store = MemoryIndexStore::new();
        assert_eq!(store.counter_get("users.count").await.unwrap(), 0);
        store.set_counter("users.count", 12).await;
        assert_eq!(store.counter_get("users.count").await.unwrap(), 12);
    }
}
