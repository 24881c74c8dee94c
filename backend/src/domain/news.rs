//! Editorial content: articles, likes and comments.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::validation::{ValidationError, bounded_text, optional_text};
use crate::domain::{AdminId, CommentId, NewsId, UserId};

/// Minimum title length.
pub const TITLE_MIN: usize = 5;
/// Maximum title length.
pub const TITLE_MAX: usize = 200;
/// Maximum summary length.
pub const SUMMARY_MAX: usize = 300;
/// Maximum number of tags per article.
pub const TAGS_MAX: usize = 10;
/// Maximum length of a single tag.
pub const TAG_MAX: usize = 30;
/// Maximum comment length.
pub const COMMENT_MAX: usize = 1000;

macro_rules! snake_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($field:literal) {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stable snake_case name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            /// Parse the snake_case name, ignoring case.
            pub fn parse(value: &str) -> Result<Self, ValidationError> {
                let needle = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(needle))
                    .ok_or_else(|| ValidationError::NotAllowed {
                        field: $field,
                        expected: Self::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

snake_enum! {
    /// Editorial section an article belongs to.
    pub enum NewsCategory ("category") {
        Transfer => "transfer",
        MatchReport => "match_report",
        Interview => "interview",
        Analysis => "analysis",
        Breaking => "breaking",
        General => "general",
        Women => "women",
        Grassroots => "grassroots",
    }
}

snake_enum! {
    /// Publication state.
    pub enum NewsStatus ("status") {
        Draft => "draft",
        Published => "published",
    }
}

/// Comment left by a fan on an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[schema(value_type = String, format = Uuid)]
    pub id: CommentId,
    #[schema(value_type = String, format = Uuid)]
    pub user_id: UserId,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A news article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct News {
    #[schema(value_type = String, format = Uuid)]
    pub id: NewsId,
    pub title: String,
    #[schema(example = "rangers-sign-new-striker")]
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub content: String,
    pub category: NewsCategory,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub status: NewsStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[schema(value_type = String, format = Uuid)]
    pub author_id: AdminId,
    pub views: u64,
    #[schema(value_type = Vec<String>)]
    pub likes: Vec<UserId>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parse a comma-separated tag list: lower-cased, trimmed, distinct.
///
/// # Examples
/// ```
/// use pitchside::domain::parse_tags;
///
/// let tags = parse_tags("NPFL, transfers,npfl, ").expect("valid tags");
/// assert_eq!(tags, vec!["npfl", "transfers"]);
/// ```
pub fn parse_tags(raw: &str) -> Result<Vec<String>, ValidationError> {
    let mut tags: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let tag = part.trim().to_lowercase();
        if tag.is_empty() || tags.contains(&tag) {
            continue;
        }
        if tag.chars().count() > TAG_MAX {
            return Err(ValidationError::TooLong {
                field: "tags",
                max: TAG_MAX,
            });
        }
        tags.push(tag);
    }
    if tags.len() > TAGS_MAX {
        return Err(ValidationError::TooMany {
            field: "tags",
            max: TAGS_MAX,
        });
    }
    Ok(tags)
}

/// Validated article submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsDraft {
    pub title: String,
    pub summary: Option<String>,
    pub content: String,
    pub category: NewsCategory,
    pub tags: Vec<String>,
    pub status: NewsStatus,
}

impl NewsDraft {
    /// Validate a new article; status defaults to draft.
    pub fn try_new(
        title: &str,
        summary: Option<&str>,
        content: &str,
        category: &str,
        tags: Option<&str>,
        status: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            title: bounded_text("title", title, TITLE_MIN, TITLE_MAX)?,
            summary: optional_text("summary", summary, SUMMARY_MAX)?,
            content: content_text(content)?,
            category: NewsCategory::parse(category)?,
            tags: tags.map(parse_tags).transpose()?.unwrap_or_default(),
            status: status
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(NewsStatus::parse)
                .transpose()?
                .unwrap_or(NewsStatus::Draft),
        })
    }
}

fn content_text(content: &str) -> Result<String, ValidationError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank { field: "content" });
    }
    Ok(trimmed.to_owned())
}

/// Partial article update; `None` keeps the current value.
///
/// An empty summary clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsPatch {
    pub title: Option<String>,
    pub summary: Option<Option<String>>,
    pub content: Option<String>,
    pub category: Option<NewsCategory>,
    pub tags: Option<Vec<String>>,
    pub status: Option<NewsStatus>,
}

impl NewsPatch {
    /// Validate the supplied fields.
    pub fn try_new(
        title: Option<&str>,
        summary: Option<&str>,
        content: Option<&str>,
        category: Option<&str>,
        tags: Option<&str>,
        status: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            title: title
                .map(|v| bounded_text("title", v, TITLE_MIN, TITLE_MAX))
                .transpose()?,
            summary: summary
                .map(|v| optional_text("summary", Some(v), SUMMARY_MAX))
                .transpose()?,
            content: content.map(content_text).transpose()?,
            category: category.map(NewsCategory::parse).transpose()?,
            tags: tags.map(parse_tags).transpose()?,
            status: status.map(NewsStatus::parse).transpose()?,
        })
    }
}

/// Validated comment body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBody(String);

impl CommentBody {
    /// Trim and bound the body.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        bounded_text("body", raw, 1, COMMENT_MAX).map(Self)
    }

    /// Borrow the text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl News {
    /// Build a new article from a validated draft.
    pub fn new(
        id: NewsId,
        slug: String,
        draft: NewsDraft,
        author_id: AdminId,
        image_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let published_at = (draft.status == NewsStatus::Published).then_some(now);
        Self {
            id,
            title: draft.title,
            slug,
            summary: draft.summary,
            content: draft.content,
            category: draft.category,
            tags: draft.tags,
            image_url,
            status: draft.status,
            published_at,
            author_id,
            views: 0,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update; the slug is kept.
    ///
    /// `published_at` is set the first time the article is published and
    /// kept afterwards, even if it returns to draft.
    pub fn apply(&mut self, patch: NewsPatch, image_url: Option<String>, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(summary) = patch.summary {
            self.summary = summary;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if self.status == NewsStatus::Published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
        if image_url.is_some() {
            self.image_url = image_url;
        }
        self.updated_at = now;
    }

    /// Whether the article is publicly visible.
    pub fn is_published(&self) -> bool {
        self.status == NewsStatus::Published
    }

    /// Like or unlike on behalf of `user`; returns whether the user now likes it.
    pub fn toggle_like(&mut self, user: UserId) -> bool {
        if let Some(index) = self.likes.iter().position(|id| *id == user) {
            self.likes.remove(index);
            false
        } else {
            self.likes.push(user);
            true
        }
    }

    /// Append a comment and return it.
    pub fn add_comment(&mut self, comment: Comment) -> &Comment {
        self.comments.push(comment);
        let index = self.comments.len() - 1;
        &self.comments[index]
    }

    /// Find a comment by id.
    pub fn comment(&self, id: CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == id)
    }

    /// Remove a comment, returning it when present.
    pub fn remove_comment(&mut self, id: CommentId) -> Option<Comment> {
        let index = self.comments.iter().position(|c| c.id == id)?;
        Some(self.comments.remove(index))
    }
}

/// Filters accepted by article lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsFilter {
    pub category: Option<NewsCategory>,
    pub tag: Option<String>,
    /// Case-insensitive substring matched against the title.
    pub search: Option<String>,
    /// Include drafts; only staff listings set this.
    pub include_drafts: bool,
}

impl NewsFilter {
    /// Whether `article` passes the filter.
    pub fn accepts(&self, article: &News) -> bool {
        (self.include_drafts || article.is_published())
            && self.category.is_none_or(|c| article.category == c)
            && self
                .tag
                .as_deref()
                .is_none_or(|tag| article.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
            && self.search.as_deref().is_none_or(|needle| {
                article
                    .title
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            })
    }
}

#[cfg(test)]
mod tests;
