pub mod config;
pub mod engine;
pub mod error;
pub mod jobs;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use engine::{NewsRanker, Renderer};
pub use error::{RankingError, Result};
pub use models::{SiteStats, SourceKind};
pub use services::{Cursor, MoreLink, Page};
