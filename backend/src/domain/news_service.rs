//! Article service implementing [`NewsQuery`] and [`NewsCommand`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::{debug, info, warn};

use crate::domain::ports::{
    ImageStore, ImageUpload, LikeOutcome, NewsCommand, NewsPersistenceError, NewsQuery,
    NewsRepository, UserRepository,
};
use crate::domain::revision::{WRITE_ATTEMPTS, next_stamp};
use crate::domain::service_support::{map_image_error, map_user_error};
use crate::domain::slug::{is_valid_slug, slug_candidate, slugify};
use crate::domain::{
    AdminId, Comment, CommentBody, CommentId, Error, News, NewsDraft, NewsFilter, NewsId,
    NewsPatch, Principal, Role, UserId,
};

/// Upper bound on `-2`, `-3`, … suffixes tried for one title.
const SLUG_ATTEMPTS: u32 = 50;

/// Article use-cases backed by a [`NewsRepository`].
///
/// The user repository supplies comment author names.
#[derive(Clone)]
pub struct NewsService<R, U> {
    news: Arc<R>,
    users: Arc<U>,
    images: Arc<dyn ImageStore>,
    clock: Arc<dyn Clock>,
}

impl<R, U> NewsService<R, U> {
    /// Create the service.
    pub fn new(
        news: Arc<R>,
        users: Arc<U>,
        images: Arc<dyn ImageStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            news,
            users,
            images,
            clock,
        }
    }
}

fn map_news_error(err: NewsPersistenceError) -> Error {
    match err {
        NewsPersistenceError::Connection { message } => {
            warn!(%message, "news repository unavailable");
            Error::service_unavailable("news store is unavailable")
        }
        NewsPersistenceError::Query { message } => {
            Error::internal(format!("news repository query failed: {message}"))
        }
        NewsPersistenceError::DuplicateSlug { slug } => {
            Error::conflict(format!("slug {slug} is already taken"))
        }
        NewsPersistenceError::Stale { id } => {
            Error::conflict(format!("news {id} is being edited concurrently; retry"))
        }
    }
}

fn news_not_found() -> Error {
    Error::not_found("news not found")
}

impl<R, U> NewsService<R, U>
where
    R: NewsRepository,
    U: UserRepository,
{
    async fn load(&self, id: NewsId) -> Result<News, Error> {
        self.news
            .find_by_id(&id)
            .await
            .map_err(map_news_error)?
            .ok_or_else(news_not_found)
    }

    /// Published article; drafts look missing to fans.
    async fn load_published(&self, id: NewsId) -> Result<News, Error> {
        let article = self.load(id).await?;
        if article.is_published() {
            Ok(article)
        } else {
            Err(news_not_found())
        }
    }

    async fn upload(&self, image: Option<ImageUpload>) -> Result<Option<String>, Error> {
        match image {
            Some(image) => Ok(Some(
                self.images.upload(&image).await.map_err(map_image_error)?,
            )),
            None => Ok(None),
        }
    }

    /// Insert `article` under the first free slug derived from its title.
    async fn insert_with_unique_slug(&self, mut article: News) -> Result<News, Error> {
        let base = slugify(&article.title);
        for attempt in 1..=SLUG_ATTEMPTS {
            let candidate = slug_candidate(&base, attempt);
            if self
                .news
                .slug_exists(&candidate)
                .await
                .map_err(map_news_error)?
            {
                continue;
            }
            article.slug = candidate;
            match self.news.insert(&article).await {
                Ok(()) => return Ok(article),
                Err(NewsPersistenceError::DuplicateSlug { slug }) => {
                    debug!(%slug, "slug taken concurrently; trying next");
                }
                Err(err) => return Err(map_news_error(err)),
            }
        }
        Err(Error::conflict(format!(
            "could not find a free slug for \"{}\"",
            article.title
        )))
    }
}

#[async_trait]
impl<R, U> NewsQuery for NewsService<R, U>
where
    R: NewsRepository,
    U: UserRepository,
{
    async fn list(&self, filter: NewsFilter, page: PageRequest) -> Result<Page<News>, Error> {
        self.news
            .list(&filter, page)
            .await
            .map_err(map_news_error)
    }

    async fn by_slug(&self, slug: String) -> Result<News, Error> {
        let slug = slug.trim();
        if !is_valid_slug(slug) {
            return Err(news_not_found());
        }
        self.news
            .record_view(slug)
            .await
            .map_err(map_news_error)?
            .ok_or_else(news_not_found)
    }

    async fn by_id(&self, id: NewsId, include_drafts: bool) -> Result<News, Error> {
        if include_drafts {
            self.load(id).await
        } else {
            self.load_published(id).await
        }
    }
}

#[async_trait]
impl<R, U> NewsCommand for NewsService<R, U>
where
    R: NewsRepository,
    U: UserRepository,
{
    async fn create(
        &self,
        author: AdminId,
        draft: NewsDraft,
        image: Option<ImageUpload>,
    ) -> Result<News, Error> {
        let image_url = self.upload(image).await?;
        let article = News::new(
            NewsId::random(),
            String::new(),
            draft,
            author,
            image_url,
            self.clock.utc(),
        );
        let article = self.insert_with_unique_slug(article).await?;
        info!(news_id = %article.id, slug = %article.slug, author_id = %author, "news created");
        Ok(article)
    }

    async fn update(
        &self,
        id: NewsId,
        patch: NewsPatch,
        image: Option<ImageUpload>,
    ) -> Result<News, Error> {
        let image_url = self.upload(image).await?;
        let mut attempt = 1;
        loop {
            let mut article = self.load(id).await?;
            let read_at = article.updated_at;
            let now = self.clock.utc();
            article.apply(patch.clone(), image_url.clone(), now);
            article.updated_at = next_stamp(read_at, now);
            match self.news.update(&article, read_at).await {
                Ok(true) => {
                    info!(news_id = %id, "news updated");
                    return Ok(article);
                }
                Ok(false) => return Err(news_not_found()),
                Err(NewsPersistenceError::Stale { .. }) if attempt < WRITE_ATTEMPTS => {
                    debug!(news_id = %id, attempt, "article edited underneath; replaying");
                    attempt += 1;
                }
                Err(err) => return Err(map_news_error(err)),
            }
        }
    }

    async fn delete(&self, id: NewsId) -> Result<(), Error> {
        if self.news.delete(&id).await.map_err(map_news_error)? {
            info!(news_id = %id, "news deleted");
            Ok(())
        } else {
            Err(news_not_found())
        }
    }

    async fn toggle_like(&self, id: NewsId, user: UserId) -> Result<LikeOutcome, Error> {
        self.news
            .toggle_like(&id, &user)
            .await
            .map_err(map_news_error)?
            .ok_or_else(news_not_found)
    }

    async fn add_comment(
        &self,
        id: NewsId,
        user: UserId,
        body: CommentBody,
    ) -> Result<Comment, Error> {
        self.load_published(id).await?;
        let author = self
            .users
            .find_by_id(&user)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        let comment = Comment {
            id: CommentId::random(),
            user_id: user,
            author_name: author.user.full_name(),
            body: body.as_str().to_owned(),
            created_at: self.clock.utc(),
        };
        if !self
            .news
            .add_comment(&id, &comment)
            .await
            .map_err(map_news_error)?
        {
            return Err(news_not_found());
        }
        debug!(news_id = %id, comment_id = %comment.id, "comment added");
        Ok(comment)
    }

    async fn delete_comment(
        &self,
        id: NewsId,
        comment_id: CommentId,
        actor: Principal,
    ) -> Result<(), Error> {
        let article = self.load(id).await?;
        let comment = article
            .comment(comment_id)
            .ok_or_else(|| Error::not_found("comment not found"))?;
        let is_author = actor.role() == Role::User
            && comment.user_id == actor.user_id();
        if !is_author && !actor.role().is_staff() {
            return Err(Error::forbidden("you can only delete your own comments"));
        }
        if !self
            .news
            .remove_comment(&id, &comment_id)
            .await
            .map_err(map_news_error)?
        {
            return Err(Error::not_found("comment not found"));
        }
        debug!(news_id = %id, %comment_id, "comment deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "news_service_tests.rs"]
mod tests;
