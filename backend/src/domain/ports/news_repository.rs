//! Port abstraction for article persistence adapters and their errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::{Comment, CommentId, News, NewsFilter, NewsId, UserId};

use super::{LikeOutcome, define_port_error};

define_port_error! {
    /// Persistence errors raised by news repository adapters.
    pub enum NewsPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "news repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "news repository query failed: {message}",
        /// Another article already uses the slug.
        DuplicateSlug { slug: String } => "slug {slug} is already taken",
        /// The article was edited by someone else since it was read.
        Stale { id: String } => "news {id} changed since it was read",
    }
}

/// Port for storing articles with their embedded comments and likes.
///
/// Views, likes and comments change through their own atomic operations;
/// [`NewsRepository::update`] never writes them, so fan activity and
/// editorial changes cannot overwrite each other.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Insert a new article.
    async fn insert(&self, article: &News) -> Result<(), NewsPersistenceError>;

    /// Store the editorial fields of an article whose `updated_at` is still
    /// `read_at`.
    ///
    /// Returns `false` when the article no longer exists and
    /// [`NewsPersistenceError::Stale`] when another edit got there first.
    async fn update(
        &self,
        article: &News,
        read_at: DateTime<Utc>,
    ) -> Result<bool, NewsPersistenceError>;

    /// Add or remove `user`'s like on a published article; `None` when no
    /// such article is published.
    async fn toggle_like(
        &self,
        id: &NewsId,
        user: &UserId,
    ) -> Result<Option<LikeOutcome>, NewsPersistenceError>;

    /// Append a comment to a published article; `false` when no such
    /// article is published.
    async fn add_comment(&self, id: &NewsId, comment: &Comment)
    -> Result<bool, NewsPersistenceError>;

    /// Remove a comment; `false` when the article or comment is gone.
    async fn remove_comment(
        &self,
        id: &NewsId,
        comment_id: &CommentId,
    ) -> Result<bool, NewsPersistenceError>;

    /// Fetch an article by identifier.
    async fn find_by_id(&self, id: &NewsId) -> Result<Option<News>, NewsPersistenceError>;

    /// Whether any article uses `slug`.
    async fn slug_exists(&self, slug: &str) -> Result<bool, NewsPersistenceError>;

    /// Increment the view counter of the published article with `slug` and
    /// return it.
    async fn record_view(&self, slug: &str) -> Result<Option<News>, NewsPersistenceError>;

    /// Delete an article; returns `false` when nothing was deleted.
    async fn delete(&self, id: &NewsId) -> Result<bool, NewsPersistenceError>;

    /// List articles passing `filter`, most recently published first.
    async fn list(
        &self,
        filter: &NewsFilter,
        page: PageRequest,
    ) -> Result<Page<News>, NewsPersistenceError>;
}
