// ============================================
// Recompute Job (分數與排名重算任務)
// ============================================
//
// Re-derives score and rank for every item on the board.
//
// Workflow:
// 1. Walk the creation index (`news.cron`) oldest first, one batch at a time
// 2. For each item, read its net votes and compute score + rank
// 3. Write `{score, rank}` back on the item hash
// 4. Re-key the item in the rank index (`news.top`)
//
// Each item is handled independently: a missing record or a store failure
// is logged and skipped, never aborting the walk. Every step is idempotent,
// so a pass can be resumed from any offset.
//
// Usage:
//   ranking-service --mode recompute

use crate::config::RecomputeConfig;
use crate::error::{RankingError, Result};
use crate::services::scoring::rank_fields;
use crate::utils::Clock;
use chrono::{DateTime, Utc};
use news_store::{IndexStore, ItemId, RangeOrder, RankFields, SortedIndex, VoteSource};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Recompute pass statistics
#[derive(Debug, Clone, Default)]
pub struct RecomputeStats {
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub start_offset: u64,
    pub items_visited: u64,
    pub items_updated: u64,
    pub items_skipped: u64,
    pub total_duration_ms: u64,
}

/// Recompute job runner
pub struct RecomputeJob<S, V, C> {
    config: RecomputeConfig,
    store: Arc<S>,
    votes: Arc<V>,
    clock: Arc<C>,
}

impl<S, V, C> RecomputeJob<S, V, C>
where
    S: IndexStore,
    V: VoteSource,
    C: Clock,
{
    pub fn new(config: RecomputeConfig, store: Arc<S>, votes: Arc<V>, clock: Arc<C>) -> Self {
        Self {
            config,
            store,
            votes,
            clock,
        }
    }

    /// Run passes until `run_once`, sleeping `interval_secs` in between.
    ///
    /// `start_offset` only applies to the first pass; later passes walk the
    /// whole creation index.
    pub async fn run(&self) -> Result<RecomputeStats> {
        let mut offset = self.config.start_offset;
        loop {
            let stats = self.run_single_pass(offset).await?;

            if self.config.run_once {
                return Ok(stats);
            }
            offset = 0;

            info!(
                interval_secs = self.config.interval_secs,
                "Sleeping until next recompute pass"
            );
            sleep(Duration::from_secs(self.config.interval_secs)).await;
        }
    }

    /// Walk the creation index once, starting at `start_offset`.
    ///
    /// Only a failure to read the creation index itself ends the pass early.
    pub async fn run_single_pass(&self, start_offset: u64) -> Result<RecomputeStats> {
        if self.config.batch_size == 0 {
            return Err(RankingError::InvariantViolation(
                "recompute batch_size must be positive".into(),
            ));
        }

        let start_time = Instant::now();
        let mut stats = RecomputeStats {
            started_at: Some(Utc::now()),
            start_offset,
            ..Default::default()
        };

        info!(
            start_offset,
            batch_size = self.config.batch_size,
            "Starting recompute pass"
        );

        let batch_size = self.config.batch_size as u64;
        let mut offset = start_offset;

        loop {
            let (ids, total) = self
                .store
                .sorted_index_range(
                    SortedIndex::Creation,
                    offset,
                    batch_size,
                    RangeOrder::Ascending,
                )
                .await
                .map_err(|e| {
                    error!(offset, error = %e, "Failed to read creation index");
                    RankingError::from(e)
                })?;

            if ids.is_empty() {
                break;
            }

            debug!(offset, items = ids.len(), total, "Processing recompute batch");

            for id in &ids {
                stats.items_visited += 1;

                match self.recompute_item(*id).await {
                    Ok(fields) => {
                        stats.items_updated += 1;
                        debug!(
                            item_id = id,
                            score = fields.score,
                            rank = fields.rank,
                            "Recomputed item"
                        );
                    }
                    Err(RankingError::NotFound(what)) => {
                        stats.items_skipped += 1;
                        warn!(
                            item_id = id,
                            missing = %what,
                            "Item vanished during recompute, skipping"
                        );
                    }
                    Err(e) => {
                        stats.items_skipped += 1;
                        error!(item_id = id, error = %e, "Failed to recompute item, skipping");
                    }
                }
            }

            offset += ids.len() as u64;
            if offset >= total {
                break;
            }

            if self.config.batch_delay_ms > 0 {
                sleep(Duration::from_millis(self.config.batch_delay_ms)).await;
            }
        }

        stats.completed_at = Some(Utc::now());
        stats.total_duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            visited = stats.items_visited,
            updated = stats.items_updated,
            skipped = stats.items_skipped,
            duration_ms = stats.total_duration_ms,
            "Recompute pass completed"
        );

        Ok(stats)
    }

    /// Re-derive and persist score and rank for one item.
    pub async fn recompute_item(&self, id: ItemId) -> Result<RankFields> {
        let item = self
            .store
            .get_item(id)
            .await?
            .ok_or_else(|| RankingError::NotFound(format!("item {}", id)))?;

        let net_votes = self.votes.get_net_votes(id).await?;
        let fields = rank_fields(net_votes, item.age_secs(self.clock.now()));

        self.store.put_item_fields(id, fields).await?;
        self.store
            .sorted_index_upsert(SortedIndex::Top, id, fields.rank)
            .await?;

        Ok(fields)
    }
}
