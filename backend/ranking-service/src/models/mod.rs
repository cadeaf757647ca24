use crate::config::PaginationConfig;
use news_store::{SortedIndex, UserId};
use serde::{Deserialize, Serialize};

/// The list views the board serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Top,                // 按排名
    Latest,             // 按發布時間
    PostedBy(UserId),   // 用戶發布
    SavedBy(UserId),    // 用戶收藏
}

impl SourceKind {
    /// Index backing this view.
    pub fn index(&self) -> SortedIndex {
        match self {
            SourceKind::Top => SortedIndex::Top,
            SourceKind::Latest => SortedIndex::Creation,
            SourceKind::PostedBy(user) => SortedIndex::PostedBy(*user),
            SourceKind::SavedBy(user) => SortedIndex::SavedBy(*user),
        }
    }

    /// "More" link template for this view.
    pub fn link_template(&self) -> String {
        match self {
            SourceKind::Top => "/top/$".to_string(),
            SourceKind::Latest => "/latest/$".to_string(),
            SourceKind::PostedBy(user) => format!("/usernews/{}/$", user),
            SourceKind::SavedBy(_) => "/saved/$".to_string(),
        }
    }

    pub fn page_size(&self, config: &PaginationConfig) -> u32 {
        match self {
            SourceKind::Top => config.top_news_per_page,
            SourceKind::Latest | SourceKind::PostedBy(_) => config.latest_news_per_page,
            SourceKind::SavedBy(_) => config.saved_news_per_page,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Top => "top",
            SourceKind::Latest => "latest",
            SourceKind::PostedBy(_) => "posted",
            SourceKind::SavedBy(_) => "saved",
        }
    }
}

/// Board totals shown on the admin page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteStats {
    pub users: i64,
    pub news: u64,
    /// Store memory footprint, e.g. "1.02M"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_memory: Option<String>,
}
