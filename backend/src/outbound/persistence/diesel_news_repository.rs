//! PostgreSQL-backed `NewsRepository` implementation using Diesel ORM.
//!
//! Comments live in a JSONB array and likes in a `UUID[]` column. Views,
//! likes and comments are changed in place by single statements; editorial
//! updates only touch their own columns and are guarded by `updated_at`, so
//! neither kind of write can overwrite the other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::ports::{LikeOutcome, NewsPersistenceError, NewsRepository};
use crate::domain::{
    AdminId, Comment, CommentId, News, NewsCategory, NewsFilter, NewsId, NewsStatus, UserId,
};

use super::diesel_basic_error_mapping::{DbFailure, classify, is_unique_violation, pool_message};
use super::diesel_helpers::{from_json, like_contains, page_window, to_json, total_count};
use super::models::{LikeToggleRow, NewsEditRow, NewsRow};
use super::pool::{DbPool, PoolError};
use super::schema::news;

const SLUG_CONSTRAINT: &str = "news_slug_key";

const TOGGLE_LIKE: &str = "UPDATE news \
    SET likes = CASE WHEN $2 = ANY(likes) THEN array_remove(likes, $2) \
                     ELSE array_append(likes, $2) END \
    WHERE id = $1 AND status = 'published' \
    RETURNING ($2 = ANY(likes)) AS liked, cardinality(likes)::BIGINT AS likes";

const ADD_COMMENT: &str = "UPDATE news SET comments = comments || jsonb_build_array($2::jsonb) \
    WHERE id = $1 AND status = 'published'";

const REMOVE_COMMENT: &str = "UPDATE news \
    SET comments = COALESCE(( \
        SELECT jsonb_agg(c.value ORDER BY c.ord) \
        FROM jsonb_array_elements(comments) WITH ORDINALITY AS c(value, ord) \
        WHERE c.value->>'id' <> $2), '[]'::jsonb) \
    WHERE id = $1 AND comments @> jsonb_build_array(jsonb_build_object('id', $2))";

/// Diesel-backed implementation of the [`NewsRepository`] port.
#[derive(Clone)]
pub struct DieselNewsRepository {
    pool: DbPool,
}

impl DieselNewsRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NewsPersistenceError {
    NewsPersistenceError::connection(pool_message(error))
}

fn map_failure(failure: DbFailure) -> NewsPersistenceError {
    match failure {
        DbFailure::Connection(message) => NewsPersistenceError::connection(message),
        DbFailure::Query(message) => NewsPersistenceError::query(message),
        DbFailure::Unique { constraint } => NewsPersistenceError::query(format!(
            "unique violation on {}",
            constraint.as_deref().unwrap_or("news")
        )),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> NewsPersistenceError {
    map_failure(classify(error))
}

fn map_write_error(error: diesel::result::Error, slug: &str) -> NewsPersistenceError {
    let failure = classify(error);
    if is_unique_violation(&failure, SLUG_CONSTRAINT) {
        NewsPersistenceError::duplicate_slug(slug)
    } else {
        map_failure(failure)
    }
}

fn article_to_row(article: &News) -> Result<NewsRow, NewsPersistenceError> {
    Ok(NewsRow {
        id: *article.id.as_uuid(),
        title: article.title.clone(),
        slug: article.slug.clone(),
        summary: article.summary.clone(),
        content: article.content.clone(),
        category: article.category.as_str().to_owned(),
        tags: article.tags.clone(),
        image_url: article.image_url.clone(),
        status: article.status.as_str().to_owned(),
        published_at: article.published_at,
        author_id: *article.author_id.as_uuid(),
        views: i64::try_from(article.views)
            .map_err(|_| NewsPersistenceError::query("view counter is out of range"))?,
        likes: article.likes.iter().map(|id| *id.as_uuid()).collect(),
        comments: to_json(&article.comments, "comments").map_err(NewsPersistenceError::query)?,
        created_at: article.created_at,
        updated_at: article.updated_at,
    })
}

fn article_to_edit(article: &News) -> NewsEditRow {
    NewsEditRow {
        title: article.title.clone(),
        summary: article.summary.clone(),
        content: article.content.clone(),
        category: article.category.as_str().to_owned(),
        tags: article.tags.clone(),
        image_url: article.image_url.clone(),
        status: article.status.as_str().to_owned(),
        published_at: article.published_at,
        updated_at: article.updated_at,
    }
}

fn row_to_article(row: NewsRow) -> Result<News, NewsPersistenceError> {
    Ok(News {
        id: NewsId::from_uuid(row.id),
        title: row.title,
        slug: row.slug,
        summary: row.summary,
        content: row.content,
        category: NewsCategory::parse(&row.category)
            .map_err(|err| NewsPersistenceError::query(format!("stored category: {err}")))?,
        tags: row.tags,
        image_url: row.image_url,
        status: NewsStatus::parse(&row.status)
            .map_err(|err| NewsPersistenceError::query(format!("stored status: {err}")))?,
        published_at: row.published_at,
        author_id: AdminId::from_uuid(row.author_id),
        views: u64::try_from(row.views).unwrap_or(0),
        likes: row.likes.into_iter().map(UserId::from_uuid).collect(),
        comments: from_json(row.comments, "comments").map_err(NewsPersistenceError::query)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn filtered(filter: &NewsFilter) -> news::BoxedQuery<'static, Pg> {
    let mut query = news::table.into_boxed();
    if !filter.include_drafts {
        query = query.filter(news::status.eq(NewsStatus::Published.as_str()));
    }
    if let Some(category) = filter.category {
        query = query.filter(news::category.eq(category.as_str()));
    }
    if let Some(tag) = filter.tag.as_deref() {
        query = query.filter(news::tags.contains(vec![tag.trim().to_lowercase()]));
    }
    if let Some(search) = filter.search.as_deref() {
        query = query.filter(news::title.ilike(like_contains(search)));
    }
    query
}

#[async_trait]
impl NewsRepository for DieselNewsRepository {
    async fn insert(&self, article: &News) -> Result<(), NewsPersistenceError> {
        let row = article_to_row(article)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(news::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, &article.slug))
    }

    async fn update(
        &self,
        article: &News,
        read_at: DateTime<Utc>,
    ) -> Result<bool, NewsPersistenceError> {
        let id = article.id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            news::table
                .find(id)
                .filter(news::updated_at.eq(read_at)),
        )
        .set(&article_to_edit(article))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated > 0 {
            return Ok(true);
        }
        let present: bool = diesel::select(exists(news::table.find(id)))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if present {
            Err(NewsPersistenceError::stale(article.id.to_string()))
        } else {
            Ok(false)
        }
    }

    async fn toggle_like(
        &self,
        id: &NewsId,
        user: &UserId,
    ) -> Result<Option<LikeOutcome>, NewsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<LikeToggleRow> = diesel::sql_query(TOGGLE_LIKE)
            .bind::<sql_types::Uuid, _>(*id.as_uuid())
            .bind::<sql_types::Uuid, _>(*user.as_uuid())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(|row| LikeOutcome {
            liked: row.liked,
            likes: u64::try_from(row.likes).unwrap_or(0),
        }))
    }

    async fn add_comment(
        &self,
        id: &NewsId,
        comment: &Comment,
    ) -> Result<bool, NewsPersistenceError> {
        let value = to_json(comment, "comment").map_err(NewsPersistenceError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::sql_query(ADD_COMMENT)
            .bind::<sql_types::Uuid, _>(*id.as_uuid())
            .bind::<sql_types::Jsonb, _>(value)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn remove_comment(
        &self,
        id: &NewsId,
        comment_id: &CommentId,
    ) -> Result<bool, NewsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::sql_query(REMOVE_COMMENT)
            .bind::<sql_types::Uuid, _>(*id.as_uuid())
            .bind::<sql_types::Text, _>(comment_id.to_string())
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn find_by_id(&self, id: &NewsId) -> Result<Option<News>, NewsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<NewsRow> = news::table
            .find(id.as_uuid())
            .select(NewsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_article).transpose()
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, NewsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = news::table
            .filter(news::slug.eq(slug))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(total > 0)
    }

    async fn record_view(&self, slug: &str) -> Result<Option<News>, NewsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<NewsRow> = diesel::update(
            news::table
                .filter(news::slug.eq(slug))
                .filter(news::status.eq(NewsStatus::Published.as_str())),
        )
        .set(news::views.eq(news::views + 1))
        .returning(NewsRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        row.map(row_to_article).transpose()
    }

    async fn delete(&self, id: &NewsId) -> Result<bool, NewsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(news::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list(
        &self,
        filter: &NewsFilter,
        page: PageRequest,
    ) -> Result<Page<News>, NewsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let (limit, offset) = page_window(page);
        let rows: Vec<NewsRow> = filtered(filter)
            .order((
                news::published_at.desc().nulls_last(),
                news::created_at.desc(),
                news::id.asc(),
            ))
            .limit(limit)
            .offset(offset)
            .select(NewsRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let articles = rows
            .into_iter()
            .map(row_to_article)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(articles, page, total_count(total)))
    }
}
