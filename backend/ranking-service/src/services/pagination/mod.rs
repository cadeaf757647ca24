//! "Show more" pagination
//!
//! Serves page-sized windows over any ordered collection. The caller supplies
//! a `PageSource` that knows how to fetch a window (and the current total)
//! and how to render one element; the paginator never looks at what the
//! renderer produces, so the same logic backs every list view.
//!
//! Nothing is cached between calls: the total is read fresh on every page,
//! so the "more" link is only correct for the call that produced it.

use crate::error::{RankingError, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

/// Placeholder replaced by the next offset in a cursor's link template.
pub const LINK_PLACEHOLDER: &str = "$";

/// Pagination state passed between successive page requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cursor {
    start: u64,
    page_size: u32,
    link_template: String,
}

impl Cursor {
    /// Negative `start` is clamped to 0. A zero `page_size` or a template
    /// without the `$` placeholder is rejected.
    pub fn new(start: i64, page_size: u32, link_template: impl Into<String>) -> Result<Self> {
        let link_template = link_template.into();
        if page_size == 0 {
            return Err(RankingError::InvariantViolation(
                "page_size must be positive".into(),
            ));
        }
        if !link_template.contains(LINK_PLACEHOLDER) {
            return Err(RankingError::InvariantViolation(format!(
                "link template `{}` has no `{}` placeholder",
                link_template, LINK_PLACEHOLDER
            )));
        }

        Ok(Self {
            start: start.max(0) as u64,
            page_size,
            link_template,
        })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn link_template(&self) -> &str {
        &self.link_template
    }

    /// Offset of the page following this one.
    pub fn next_start(&self) -> u64 {
        self.start + self.page_size as u64
    }

    /// Link for `offset`: the first placeholder is substituted.
    pub fn link_for(&self, offset: u64) -> String {
        self.link_template
            .replacen(LINK_PLACEHOLDER, &offset.to_string(), 1)
    }

    /// The same cursor positioned at the next page.
    pub fn next(&self) -> Cursor {
        Cursor {
            start: self.next_start(),
            page_size: self.page_size,
            link_template: self.link_template.clone(),
        }
    }
}

/// The "more" affordance emitted when another page exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoreLink {
    pub href: String,
    pub cursor: Cursor,
}

/// One rendered page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub more: Option<MoreLink>,
}

impl<T> Page<T> {
    pub fn next_cursor(&self) -> Option<&Cursor> {
        self.more.as_ref().map(|more| &more.cursor)
    }
}

/// Fetch/render capability for one list view.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;
    type Output: Send;

    /// Up to `count` elements starting at `start`, plus the collection's
    /// current total.
    async fn fetch(&self, start: u64, count: u64) -> Result<(Vec<Self::Item>, u64)>;

    fn render(&self, item: &Self::Item) -> Self::Output;
}

/// Render one page of `source` at `cursor`.
///
/// Calls `fetch` exactly once. Fetch errors propagate; a user-facing page is
/// never rendered from partial data.
pub async fn list_items<S>(source: &S, cursor: &Cursor) -> Result<Page<S::Output>>
where
    S: PageSource + ?Sized,
{
    let (items, total) = source
        .fetch(cursor.start(), cursor.page_size() as u64)
        .await?;

    let rendered: Vec<S::Output> = items.iter().map(|item| source.render(item)).collect();

    let next_start = cursor.next_start();
    let more = (next_start < total).then(|| MoreLink {
        href: cursor.link_for(next_start),
        cursor: cursor.next(),
    });

    debug!(
        start = cursor.start(),
        page_size = cursor.page_size(),
        returned = rendered.len(),
        total,
        has_more = more.is_some(),
        "Listed page"
    );

    Ok(Page {
        items: rendered,
        more,
    })
}
