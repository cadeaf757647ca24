use crate::{Item, ItemId, RangeOrder, RankFields, SortedIndex, StoreResult};
use async_trait::async_trait;

/// Key-value + sorted-set store holding item records and their indices.
///
/// Every call is a suspension point; implementations guarantee atomicity per
/// key only.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Fetch one item record, `None` when absent.
    async fn get_item(&self, id: ItemId) -> StoreResult<Option<Item>>;

    /// Fetch several records, preserving the order of `ids`.
    async fn get_items(&self, ids: &[ItemId]) -> StoreResult<Vec<Option<Item>>> {
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            items.push(self.get_item(*id).await?);
        }
        Ok(items)
    }

    /// Overwrite score and rank on an existing record.
    ///
    /// Fails with `StoreError::NotFound` when the record is absent; the write
    /// never recreates a record.
    async fn put_item_fields(&self, id: ItemId, fields: RankFields) -> StoreResult<()>;

    /// Insert or re-key `id` in `index`.
    async fn sorted_index_upsert(&self, index: SortedIndex, id: ItemId, key: f64)
        -> StoreResult<()>;

    /// Return up to `count` ids starting at `start`, together with the
    /// current cardinality of the index.
    async fn sorted_index_range(
        &self,
        index: SortedIndex,
        start: u64,
        count: u64,
        order: RangeOrder,
    ) -> StoreResult<(Vec<ItemId>, u64)>;

    async fn sorted_index_len(&self, index: SortedIndex) -> StoreResult<u64>;

    /// Read a counter; a counter that was never written reads as 0.
    async fn counter_get(&self, name: &str) -> StoreResult<i64>;

    async fn existence_check(&self, id: ItemId) -> StoreResult<bool>;

    /// Human readable memory footprint of the backing store, if it reports one.
    async fn memory_used(&self) -> StoreResult<Option<String>> {
        Ok(None)
    }
}

/// Read-only view of the voting subsystem.
#[async_trait]
pub trait VoteSource: Send + Sync {
    async fn get_net_votes(&self, id: ItemId) -> StoreResult<i64>;
}
