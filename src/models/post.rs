use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::vote::{CounterDelta, VoteKind};
use crate::ranking::Rankable;

/// What a post carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Text,
    Link,
    Image,
    Note,
}

impl PostKind {
    /// Link and image posts point at an external resource
    pub fn requires_url(self) -> bool {
        matches!(self, PostKind::Link | PostKind::Image)
    }
}

impl FromStr for PostKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(PostKind::Text),
            "link" => Ok(PostKind::Link),
            "image" => Ok(PostKind::Image),
            "note" => Ok(PostKind::Note),
            _ => Err(AppError::Validation(ERR_INVALID_POST_KIND.to_string())),
        }
    }
}

/// Post record stored in redb
/// Timestamps are Unix milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub author_id: String,
    pub community_id: String,
    pub kind: PostKind,
    pub title: String,
    pub content: Option<String>,
    pub url: Option<String>,
    /// Denormalized count of `up` rows in the vote ledger
    pub upvotes: u64,
    /// Denormalized count of `down` rows in the vote ledger
    pub downvotes: u64,
    pub created_at: i64,
}

impl PostRecord {
    /// Apply a ledger transition to the counters.
    ///
    /// A counter that would drop below zero means the ledger and the post
    /// disagree; the caller must abort the transaction.
    pub fn apply_delta(&mut self, delta: CounterDelta) -> Result<()> {
        self.upvotes = self.upvotes.checked_add_signed(delta.upvotes).ok_or_else(|| {
            AppError::Conflict(format!("upvotes underflow (was {})", self.upvotes))
        })?;
        self.downvotes = self
            .downvotes
            .checked_add_signed(delta.downvotes)
            .ok_or_else(|| {
                AppError::Conflict(format!("downvotes underflow (was {})", self.downvotes))
            })?;
        Ok(())
    }

    pub fn score(&self) -> i64 {
        self.upvotes as i64 - self.downvotes as i64
    }
}

/// Validated input for a new post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub community_id: String,
    pub kind: PostKind,
    pub title: String,
    pub content: Option<String>,
    pub url: Option<String>,
}

impl NewPost {
    /// Validate raw client fields
    pub fn parse(
        community_id: &str,
        kind: &str,
        title: &str,
        content: Option<&str>,
        url: Option<&str>,
    ) -> Result<Self> {
        if !validate_id(community_id) {
            return Err(AppError::Validation(ERR_INVALID_COMMUNITY_ID.to_string()));
        }

        let kind = kind.parse::<PostKind>()?;

        let title = title.trim();
        let title_len = title.chars().count();
        if title_len == 0 || title_len > MAX_TITLE_CHARS {
            return Err(AppError::Validation(ERR_INVALID_TITLE.to_string()));
        }

        let content = content.map(str::trim).filter(|c| !c.is_empty());
        if let Some(body) = content
            && body.chars().count() > MAX_CONTENT_CHARS
        {
            return Err(AppError::Validation(ERR_CONTENT_TOO_LONG.to_string()));
        }

        let url = url.map(str::trim).filter(|u| !u.is_empty());
        match (kind.requires_url(), url) {
            (true, None) => {
                return Err(AppError::Validation(
                    "url is required for link and image posts".to_string(),
                ));
            }
            (false, Some(_)) => {
                return Err(AppError::Validation(
                    "url is only allowed on link and image posts".to_string(),
                ));
            }
            (true, Some(u)) if !validate_url(u) => {
                return Err(AppError::Validation(
                    "url must start with http:// or https://".to_string(),
                ));
            }
            _ => {}
        }

        Ok(Self {
            community_id: community_id.to_string(),
            kind,
            title: title.to_string(),
            content: content.map(str::to_string),
            url: url.map(str::to_string),
        })
    }
}

/// Validate an opaque client-supplied identifier
pub fn validate_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_CHARS
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn validate_url(url: &str) -> bool {
    (url.starts_with("http://") || url.starts_with("https://"))
        && !url.chars().any(char::is_whitespace)
}

/// Post model for API responses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub community_id: String,
    pub kind: PostKind,
    pub title: String,
    pub content: Option<String>,
    pub url: Option<String>,
    pub upvotes: u64,
    pub downvotes: u64,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    /// The caller's vote; omitted for anonymous requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_vote: Option<Option<VoteKind>>,
}

impl Post {
    pub fn from_record(id: String, record: PostRecord) -> Self {
        let score = record.score();
        Self {
            id,
            author_id: record.author_id,
            community_id: record.community_id,
            kind: record.kind,
            title: record.title,
            content: record.content,
            url: record.url,
            upvotes: record.upvotes,
            downvotes: record.downvotes,
            score,
            created_at: DateTime::from_timestamp_millis(record.created_at).unwrap_or_default(),
            user_vote: None,
        }
    }
}

impl Rankable for Post {
    fn upvotes(&self) -> u64 {
        self.upvotes
    }

    fn downvotes(&self) -> u64 {
        self.downvotes
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
