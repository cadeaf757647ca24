//! Ranking Service - Main entry point
//!
//! Batch binary for the news board's ranking engine.
//!
//! # Modes
//! - `recompute` (default): re-derive score and rank for every item
//! - `stats`: print user and item totals
//! - `random`: print the id of a randomly picked item

use anyhow::Result;
use news_ranking::{
    utils::{elapsed_label, Clock, SystemClock},
    Config, NewsRanker,
};
use news_store::{RedisIndexStore, RedisVoteSource};
use std::env;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Service run mode
#[derive(Debug, Clone, PartialEq)]
enum RunMode {
    /// Default: recompute pass over the whole board
    Recompute,
    /// Report site totals
    Stats,
    /// Pick one item at random
    Random,
}

impl RunMode {
    fn from_args() -> Self {
        let args: Vec<String> = env::args().collect();

        for i in 0..args.len() {
            if args[i] == "--mode" && i + 1 < args.len() {
                return match args[i + 1].as_str() {
                    "recompute" => RunMode::Recompute,
                    "stats" => RunMode::Stats,
                    "random" => RunMode::Random,
                    _ => {
                        warn!("Unknown mode '{}', using default 'recompute'", args[i + 1]);
                        RunMode::Recompute
                    }
                };
            }
        }

        RunMode::Recompute
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "news_ranking=info,info".into()))
        .init();

    let mode = RunMode::from_args();

    // Load config
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    info!("Starting {} in {:?} mode", config.service.service_name, mode);

    // Initialize Redis connection
    let redis = news_store::connect(&config.redis.url).await.map_err(|e| {
        error!("Failed to connect to Redis: {}", e);
        anyhow::anyhow!("Redis connection error: {}", e)
    })?;

    let ranker = NewsRanker::new(
        Arc::new(RedisIndexStore::new(redis.clone())),
        Arc::new(RedisVoteSource::new(redis)),
        Arc::new(SystemClock),
        config.pagination.clone(),
        config.recompute.clone(),
    );

    match mode {
        RunMode::Recompute => {
            let stats = ranker.run_recompute().await?;
            info!(
                visited = stats.items_visited,
                updated = stats.items_updated,
                skipped = stats.items_skipped,
                "Recompute finished"
            );
        }
        RunMode::Stats => {
            let stats = ranker.site_stats().await?;
            println!("users: {}\nnews: {}", stats.users, stats.news);
            if let Some(memory) = stats.used_memory {
                println!("memory used: {}", memory);
            }
        }
        RunMode::Random => {
            let id = ranker.pick_random().await?;
            match ranker.item(id).await {
                Ok(item) => println!(
                    "{} {} ({})",
                    id,
                    item.title,
                    elapsed_label(item.created_at, SystemClock.now())
                ),
                Err(e) => {
                    warn!(item_id = id, error = %e, "Picked item could not be loaded");
                    println!("{}", id);
                }
            }
        }
    }

    Ok(())
}
