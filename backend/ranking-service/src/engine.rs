//! Ranking engine
//!
//! `NewsRanker` ties the store, the vote source and the clock together and
//! exposes the operations the web layer and the batch binary call.

use crate::config::{PaginationConfig, RecomputeConfig};
use crate::error::{RankingError, Result};
use crate::jobs::{RecomputeJob, RecomputeStats};
use crate::models::{SiteStats, SourceKind};
use crate::services::pagination::{list_items, Cursor, Page, PageSource};
use crate::services::random_pick;
use crate::utils::Clock;
use async_trait::async_trait;
use news_store::{
    IndexStore, Item, ItemId, RangeOrder, RankFields, SortedIndex, VoteSource, USERS_COUNTER,
};
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info};

/// Turns an item into whatever the caller displays.
pub trait Renderer: Send + Sync {
    type Output: Send;

    fn render(&self, item: &Item) -> Self::Output;
}

impl<F, O> Renderer for F
where
    F: Fn(&Item) -> O + Send + Sync,
    O: Send,
{
    type Output = O;

    fn render(&self, item: &Item) -> O {
        self(item)
    }
}

/// Page source over one sorted index, newest/highest first.
struct IndexPageSource<'a, S: ?Sized, R> {
    store: &'a S,
    index: SortedIndex,
    renderer: &'a R,
}

#[async_trait]
impl<'a, S, R> PageSource for IndexPageSource<'a, S, R>
where
    S: IndexStore + ?Sized,
    R: Renderer,
{
    type Item = Item;
    type Output = R::Output;

    async fn fetch(&self, start: u64, count: u64) -> Result<(Vec<Item>, u64)> {
        let (ids, total) = self
            .store
            .sorted_index_range(self.index, start, count, RangeOrder::Descending)
            .await?;

        let fetched = self.store.get_items(&ids).await?;
        let requested = fetched.len();
        let items: Vec<Item> = fetched.into_iter().flatten().collect();

        if items.len() < requested {
            debug!(
                index = %self.index,
                missing = requested - items.len(),
                "Skipped index entries without a record"
            );
        }

        Ok((items, total))
    }

    fn render(&self, item: &Item) -> R::Output {
        self.renderer.render(item)
    }
}

pub struct NewsRanker<S, V, C> {
    store: Arc<S>,
    pagination: PaginationConfig,
    recompute: RecomputeJob<S, V, C>,
}

impl<S, V, C> NewsRanker<S, V, C>
where
    S: IndexStore,
    V: VoteSource,
    C: Clock,
{
    pub fn new(
        store: Arc<S>,
        votes: Arc<V>,
        clock: Arc<C>,
        pagination: PaginationConfig,
        recompute: RecomputeConfig,
    ) -> Self {
        let job = RecomputeJob::new(recompute, store.clone(), votes, clock);
        Self {
            store,
            pagination,
            recompute: job,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// One full recompute pass over every item.
    pub async fn recompute_all(&self) -> Result<RecomputeStats> {
        self.recompute.run_single_pass(0).await
    }

    /// A recompute pass resumed at `offset` in the creation index.
    pub async fn recompute_from(&self, offset: u64) -> Result<RecomputeStats> {
        self.recompute.run_single_pass(offset).await
    }

    /// Run the recompute job as configured (once, or on its interval).
    pub async fn run_recompute(&self) -> Result<RecomputeStats> {
        self.recompute.run().await
    }

    /// Initialise or refresh `{score, rank}` of a single item.
    pub async fn recompute_item(&self, id: ItemId) -> Result<RankFields> {
        self.recompute.recompute_item(id).await
    }

    /// Render one page of a list view.
    ///
    /// Index entries whose record is gone are skipped; deleted items are
    /// handed to the renderer like any other.
    pub async fn list_page<R>(
        &self,
        kind: SourceKind,
        cursor: &Cursor,
        renderer: &R,
    ) -> Result<Page<R::Output>>
    where
        R: Renderer,
    {
        let source = IndexPageSource {
            store: self.store.as_ref(),
            index: kind.index(),
            renderer,
        };

        debug!(view = kind.as_str(), start = cursor.start(), "Listing page");
        list_items(&source, cursor).await
    }

    /// Cursor for `kind` with its configured page size and link.
    pub fn default_cursor(&self, kind: SourceKind, start: i64) -> Result<Cursor> {
        Cursor::new(start, kind.page_size(&self.pagination), kind.link_template())
    }

    pub async fn pick_random(&self) -> Result<ItemId> {
        random_pick::pick_random(self.store.as_ref()).await
    }

    pub async fn pick_random_with<R>(&self, rng: &mut R) -> Result<ItemId>
    where
        R: Rng + Send + ?Sized,
    {
        random_pick::pick_random_with(self.store.as_ref(), rng).await
    }

    pub async fn item(&self, id: ItemId) -> Result<Item> {
        self.store
            .get_item(id)
            .await?
            .ok_or_else(|| RankingError::NotFound(format!("item {}", id)))
    }

    pub async fn site_stats(&self) -> Result<SiteStats> {
        let users = self.store.counter_get(USERS_COUNTER).await?;
        let news = self.store.sorted_index_len(SortedIndex::Creation).await?;
        let used_memory = self.store.memory_used().await?;

        info!(users, news, used_memory = ?used_memory, "Loaded site stats");
        Ok(SiteStats {
            users,
            news,
            used_memory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::FixedClock;
    use news_store::MemoryIndexStore;

    const NOW: i64 = 1_700_000_000;

    type MemoryRanker = NewsRanker<MemoryIndexStore, MemoryIndexStore, FixedClock>;

    fn ranker(store: Arc<MemoryIndexStore>) -> MemoryRanker {
        NewsRanker::new(
            store.clone(),
            store,
            Arc::new(FixedClock(NOW)),
            PaginationConfig::default(),
            RecomputeConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_closure_renderer() {
        let store = Arc::new(MemoryIndexStore::new());
        store
            .insert_item(Item::new(1, "Hello", 1, NOW))
            .await
            .unwrap();

        let ranker = ranker(store);
        let cursor = ranker.default_cursor(SourceKind::Latest, 0).unwrap();
        let page = ranker
            .list_page(SourceKind::Latest, &cursor, &|item: &Item| item.title.clone())
            .await
            .unwrap();
        assert_eq!(page.items, vec!["Hello".to_string()]);
    }

    #[tokio::test]
    async fn test_list_skips_missing_records() {
        let store = Arc::new(MemoryIndexStore::new());
        for id in 1..=3 {
            store
                .insert_item(Item::new(id, format!("item {}", id), 1, NOW - id as i64))
                .await
                .unwrap();
        }
        store.remove_item(2).await;
        store.mark_deleted(3).await.unwrap();

        let ranker = ranker(store);
        let cursor = ranker.default_cursor(SourceKind::Latest, 0).unwrap();
        let page = ranker
            .list_page(SourceKind::Latest, &cursor, &|item: &Item| (item.id, item.deleted))
            .await
            .unwrap();
        assert_eq!(page.items, vec![(1, false), (3, true)]);
        assert!(page.more.is_none());
    }

    #[test]
    fn test_default_cursor_per_view() {
        let ranker = ranker(Arc::new(MemoryIndexStore::new()));

        let top = ranker.default_cursor(SourceKind::Top, 0).unwrap();
        assert_eq!(top.page_size(), 30);
        assert_eq!(top.link_for(30), "/top/30");

        let posted = ranker.default_cursor(SourceKind::PostedBy(9), -4).unwrap();
        assert_eq!(posted.start(), 0);
        assert_eq!(posted.link_for(100), "/usernews/9/100");

        let saved = ranker.default_cursor(SourceKind::SavedBy(9), 10).unwrap();
        assert_eq!(saved.page_size(), 10);
        assert_eq!(saved.link_for(saved.next_start()), "/saved/20");
    }

    #[tokio::test]
    async fn test_item_not_found() {
        let ranker = ranker(Arc::new(MemoryIndexStore::new()));
        let err = ranker.item(5).await.unwrap_err();
        assert!(matches!(err, RankingError::NotFound(_)));
    }
}
