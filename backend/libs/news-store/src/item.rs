//! Item record and its hash encoding
//!
//! An item is stored as the `news:{id}` hash. `score` and `rank` are derived
//! fields: they are always recomputable from `ctime` and the vote totals.

use crate::{ItemId, StoreError, StoreResult, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use url::Url;

/// A submission on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub score: f64,
    pub rank: f64,
    /// Unix timestamp (seconds)
    pub created_at: i64,
    pub author_id: UserId,
    pub deleted: bool,
    /// Vote aggregate as persisted by the voting subsystem
    pub upvotes: u64,
    pub downvotes: u64,
}

/// The derived fields written back by the recompute job.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RankFields {
    pub score: f64,
    pub rank: f64,
}

impl Item {
    pub fn new(id: ItemId, title: impl Into<String>, author_id: UserId, created_at: i64) -> Self {
        Self {
            id,
            title: title.into(),
            url: None,
            text: None,
            score: 0.0,
            rank: 0.0,
            created_at,
            author_id,
            deleted: false,
            upvotes: 0,
            downvotes: 0,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_votes(mut self, upvotes: u64, downvotes: u64) -> Self {
        self.upvotes = upvotes;
        self.downvotes = downvotes;
        self
    }

    /// Check the record invariants before it is written.
    pub fn validate(&self) -> StoreResult<()> {
        if self.id == 0 {
            return Err(StoreError::InvalidData("item id must be positive".into()));
        }
        if self.title.trim().is_empty() {
            return Err(StoreError::InvalidData(format!(
                "item {} has an empty title",
                self.id
            )));
        }
        if self.url.is_some() && self.text.is_some() {
            return Err(StoreError::InvalidData(format!(
                "item {} carries both url and text",
                self.id
            )));
        }
        Ok(())
    }

    pub fn is_text_post(&self) -> bool {
        self.url.is_none()
    }

    /// Host of the submitted url without a leading `www.`.
    ///
    /// Returns `None` for text posts and for urls that do not parse.
    pub fn domain(&self) -> Option<String> {
        let parsed = Url::parse(self.url.as_deref()?).ok()?;
        let host = parsed.host_str()?;
        Some(host.strip_prefix("www.").unwrap_or(host).to_string())
    }

    /// Seconds since creation; clock skew never yields a negative age.
    pub fn age_secs(&self, now: i64) -> i64 {
        (now - self.created_at).max(0)
    }

    pub fn net_votes(&self) -> i64 {
        self.upvotes as i64 - self.downvotes as i64
    }

    /// Encode as hash fields.
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("id", self.id.to_string()),
            ("title", self.title.clone()),
            ("user_id", self.author_id.to_string()),
            ("ctime", self.created_at.to_string()),
            ("score", self.score.to_string()),
            ("rank", self.rank.to_string()),
            ("up", self.upvotes.to_string()),
            ("down", self.downvotes.to_string()),
            ("del", if self.deleted { "1" } else { "0" }.to_string()),
        ];
        if let Some(url) = &self.url {
            fields.push(("url", url.clone()));
        }
        if let Some(text) = &self.text {
            fields.push(("text", text.clone()));
        }
        fields
    }

    /// Decode from hash fields. An empty hash means the item does not exist.
    pub fn from_fields(fields: &HashMap<String, String>) -> StoreResult<Option<Self>> {
        if fields.is_empty() {
            return Ok(None);
        }

        let id: ItemId = match fields.get("id") {
            Some(raw) => parse_field("id", raw)?,
            None => return Err(StoreError::InvalidData("item hash without id".into())),
        };

        Ok(Some(Self {
            id,
            title: fields.get("title").cloned().unwrap_or_default(),
            url: non_empty(fields.get("url")),
            text: non_empty(fields.get("text")),
            score: optional_field(fields, "score")?,
            rank: optional_field(fields, "rank")?,
            created_at: optional_field(fields, "ctime")?,
            author_id: optional_field(fields, "user_id")?,
            deleted: fields.get("del").map(|v| v == "1").unwrap_or(false),
            upvotes: optional_field(fields, "up")?,
            downvotes: optional_field(fields, "down")?,
        }))
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

fn parse_field<T: FromStr>(name: &str, raw: &str) -> StoreResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| StoreError::InvalidData(format!("field `{}` is not numeric: {}", name, raw)))
}

fn optional_field<T: FromStr + Default>(
    fields: &HashMap<String, String>,
    name: &str,
) -> StoreResult<T> {
    match fields.get(name) {
        Some(raw) if !raw.is_empty() => parse_field(name, raw),
        _ => Ok(T::default()),
    }
}
