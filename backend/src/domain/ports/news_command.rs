//! Driving ports for article reads and writes.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    AdminId, Comment, CommentBody, CommentId, Error, News, NewsDraft, NewsFilter, NewsId,
    NewsPatch, Principal, UserId,
};

use super::ImageUpload;

/// Result of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct LikeOutcome {
    /// Whether the caller now likes the article.
    pub liked: bool,
    /// Total likes after the toggle.
    pub likes: u64,
}

/// Article queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsQuery: Send + Sync {
    /// Paginated articles passing `filter`.
    async fn list(&self, filter: NewsFilter, page: PageRequest) -> Result<Page<News>, Error>;

    /// Published article by slug; counts a view.
    async fn by_slug(&self, slug: String) -> Result<News, Error>;

    /// Article by id; drafts are only visible when `include_drafts` is set.
    async fn by_id(&self, id: NewsId, include_drafts: bool) -> Result<News, Error>;
}

/// Article writes by staff and fan interactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsCommand: Send + Sync {
    /// Create an article with a unique slug derived from its title.
    async fn create(
        &self,
        author: AdminId,
        draft: NewsDraft,
        image: Option<ImageUpload>,
    ) -> Result<News, Error>;

    /// Update an article; the slug is kept.
    async fn update(
        &self,
        id: NewsId,
        patch: NewsPatch,
        image: Option<ImageUpload>,
    ) -> Result<News, Error>;

    /// Delete an article.
    async fn delete(&self, id: NewsId) -> Result<(), Error>;

    /// Like or unlike a published article.
    async fn toggle_like(&self, id: NewsId, user: UserId) -> Result<LikeOutcome, Error>;

    /// Comment on a published article.
    async fn add_comment(
        &self,
        id: NewsId,
        user: UserId,
        body: CommentBody,
    ) -> Result<Comment, Error>;

    /// Delete a comment; allowed for its author and for staff.
    async fn delete_comment(
        &self,
        id: NewsId,
        comment_id: CommentId,
        actor: Principal,
    ) -> Result<(), Error>;
}
