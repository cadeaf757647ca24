//! Random Pick
//!
//! Draws an item id uniformly in `[1, news.count]` and checks it still has a
//! record. When it does not, the current maximum id is returned instead of
//! drawing again, so the cost stays at one extra lookup at the price of a
//! bias towards the newest item.

use crate::error::{RankingError, Result};
use news_store::{IndexStore, ItemId, NEWS_COUNTER};
use rand::Rng;
use tracing::debug;

/// Pick an existing item using the thread-local RNG.
pub async fn pick_random<S>(store: &S) -> Result<ItemId>
where
    S: IndexStore + ?Sized,
{
    let max_id = read_max_id(store).await?;
    let drawn = draw_id(&mut rand::thread_rng(), max_id);
    resolve(store, max_id, drawn).await
}

/// Pick an existing item using the given RNG.
pub async fn pick_random_with<S, R>(store: &S, rng: &mut R) -> Result<ItemId>
where
    S: IndexStore + ?Sized,
    R: Rng + ?Sized,
{
    let max_id = read_max_id(store).await?;
    let drawn = draw_id(rng, max_id);
    resolve(store, max_id, drawn).await
}

async fn read_max_id<S>(store: &S) -> Result<ItemId>
where
    S: IndexStore + ?Sized,
{
    let counter = store.counter_get(NEWS_COUNTER).await?;
    if counter <= 0 {
        return Err(RankingError::InvariantViolation(format!(
            "{} is {}, nothing to pick from",
            NEWS_COUNTER, counter
        )));
    }
    Ok(counter as ItemId)
}

fn draw_id<R: Rng + ?Sized>(rng: &mut R, max_id: ItemId) -> ItemId {
    rng.gen_range(1..=max_id)
}

async fn resolve<S>(store: &S, max_id: ItemId, drawn: ItemId) -> Result<ItemId>
where
    S: IndexStore + ?Sized,
{
    if store.existence_check(drawn).await? {
        return Ok(drawn);
    }

    debug!(drawn, max_id, "Random pick hit a missing id, using newest");
    Ok(max_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use news_store::{Item, MemoryIndexStore};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_single_missing_item_returns_counter() {
        let store = MemoryIndexStore::new();
        store.set_counter(NEWS_COUNTER, 1).await;

        let picked = pick_random(&store).await.unwrap();
        assert_eq!(picked, 1);
    }

    #[tokio::test]
    async fn test_rejects_empty_counter() {
        let store = MemoryIndexStore::new();
        let err = pick_random(&store).await.unwrap_err();
        assert!(matches!(err, RankingError::InvariantViolation(_)));

        store.set_counter(NEWS_COUNTER, -3).await;
        let err = pick_random(&store).await.unwrap_err();
        assert!(matches!(err, RankingError::InvariantViolation(_)));
    }

    #[tokio::test]
    async fn test_picks_stay_in_range_and_cover_live_ids() {
        let store = MemoryIndexStore::new();
        for id in 1..=5 {
            store
                .insert_item(Item::new(id, format!("item {}", id), 1, id as i64))
                .await
                .unwrap();
        }

        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let picked = pick_random_with(&store, &mut rng).await.unwrap();
            assert!((1..=5).contains(&picked));
            seen.insert(picked);
        }
        assert_eq!(seen.len(), 5);
    }

    #[tokio::test]
    async fn test_missing_ids_fall_back_to_newest() {
        let store = MemoryIndexStore::new();
        store
            .insert_item(Item::new(4, "only survivor", 1, 0))
            .await
            .unwrap();

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            assert_eq!(pick_random_with(&store, &mut rng).await.unwrap(), 4);
        }
    }
}
