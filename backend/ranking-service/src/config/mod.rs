use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub redis: RedisConfig,
    pub pagination: PaginationConfig,
    pub recompute: RecomputeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

/// Items per page for each list view.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_top_per_page")]
    pub top_news_per_page: u32,
    #[serde(default = "default_latest_per_page")]
    pub latest_news_per_page: u32,
    #[serde(default = "default_saved_per_page")]
    pub saved_news_per_page: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            top_news_per_page: default_top_per_page(),
            latest_news_per_page: default_latest_per_page(),
            saved_news_per_page: default_saved_per_page(),
        }
    }
}

/// Recompute job configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecomputeConfig {
    /// Items read from the creation index per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    /// Position in the creation index to resume from
    #[serde(default)]
    pub start_offset: u64,
    /// Delay between batches (to avoid overloading Redis)
    #[serde(default)]
    pub batch_delay_ms: u64,
    /// Whether to run continuously or exit after one pass
    #[serde(default = "default_run_once")]
    pub run_once: bool,
    /// Interval between full passes (if not run_once)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for RecomputeConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            start_offset: 0,
            batch_delay_ms: 0,
            run_once: default_run_once(),
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_top_per_page() -> u32 {
    30
}

fn default_latest_per_page() -> u32 {
    100
}

fn default_saved_per_page() -> u32 {
    10
}

fn default_batch_size() -> u32 {
    100
}

fn default_run_once() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    3600
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        Ok(Config {
            service: ServiceConfig {
                service_name: env::var("SERVICE_NAME")
                    .unwrap_or_else(|_| "ranking-service".to_string()),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            },
            pagination: envy::prefixed("PAGINATION_").from_env()?,
            recompute: envy::prefixed("RECOMPUTE_").from_env()?,
        })
    }
}
