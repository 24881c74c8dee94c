//! In-memory article store.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::ports::{LikeOutcome, NewsPersistenceError, NewsRepository};
use crate::domain::{Comment, CommentId, News, NewsFilter, NewsId, UserId};

use super::{paginate, read, write};

/// [`NewsRepository`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryNewsRepository {
    articles: RwLock<HashMap<NewsId, News>>,
}

impl MemoryNewsRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn slug_taken(
    articles: &HashMap<NewsId, News>,
    article: &News,
) -> Result<(), NewsPersistenceError> {
    if articles
        .values()
        .any(|other| other.id != article.id && other.slug == article.slug)
    {
        return Err(NewsPersistenceError::duplicate_slug(article.slug.as_str()));
    }
    Ok(())
}

/// Most recently published first; unpublished drafts last.
fn newest_first(a: &News, b: &News) -> Ordering {
    match (a.published_at, b.published_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then(b.created_at.cmp(&a.created_at))
    .then(a.id.cmp(&b.id))
}

#[async_trait]
impl NewsRepository for MemoryNewsRepository {
    async fn insert(&self, article: &News) -> Result<(), NewsPersistenceError> {
        let mut articles = write(&self.articles);
        slug_taken(&articles, article)?;
        if articles.contains_key(&article.id) {
            return Err(NewsPersistenceError::query(format!(
                "article {} already exists",
                article.id
            )));
        }
        articles.insert(article.id, article.clone());
        Ok(())
    }

    async fn update(
        &self,
        article: &News,
        read_at: DateTime<Utc>,
    ) -> Result<bool, NewsPersistenceError> {
        let mut articles = write(&self.articles);
        let Some(stored) = articles.get_mut(&article.id) else {
            return Ok(false);
        };
        if stored.updated_at != read_at {
            return Err(NewsPersistenceError::stale(article.id.to_string()));
        }
        let News {
            slug,
            views,
            likes,
            comments,
            ..
        } = std::mem::replace(stored, article.clone());
        stored.slug = slug;
        stored.views = views;
        stored.likes = likes;
        stored.comments = comments;
        Ok(true)
    }

    async fn toggle_like(
        &self,
        id: &NewsId,
        user: &UserId,
    ) -> Result<Option<LikeOutcome>, NewsPersistenceError> {
        let mut articles = write(&self.articles);
        let Some(article) = articles.get_mut(id).filter(|a| a.is_published()) else {
            return Ok(None);
        };
        let liked = article.toggle_like(*user);
        Ok(Some(LikeOutcome {
            liked,
            likes: article.likes.len() as u64,
        }))
    }

    async fn add_comment(
        &self,
        id: &NewsId,
        comment: &Comment,
    ) -> Result<bool, NewsPersistenceError> {
        let mut articles = write(&self.articles);
        let Some(article) = articles.get_mut(id).filter(|a| a.is_published()) else {
            return Ok(false);
        };
        article.add_comment(comment.clone());
        Ok(true)
    }

    async fn remove_comment(
        &self,
        id: &NewsId,
        comment_id: &CommentId,
    ) -> Result<bool, NewsPersistenceError> {
        Ok(write(&self.articles)
            .get_mut(id)
            .and_then(|article| article.remove_comment(*comment_id))
            .is_some())
    }

    async fn find_by_id(&self, id: &NewsId) -> Result<Option<News>, NewsPersistenceError> {
        Ok(read(&self.articles).get(id).cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, NewsPersistenceError> {
        Ok(read(&self.articles)
            .values()
            .any(|article| article.slug == slug))
    }

    async fn record_view(&self, slug: &str) -> Result<Option<News>, NewsPersistenceError> {
        let mut articles = write(&self.articles);
        let Some(article) = articles
            .values_mut()
            .find(|article| article.slug == slug && article.is_published())
        else {
            return Ok(None);
        };
        article.views = article.views.saturating_add(1);
        Ok(Some(article.clone()))
    }

    async fn delete(&self, id: &NewsId) -> Result<bool, NewsPersistenceError> {
        Ok(write(&self.articles).remove(id).is_some())
    }

    async fn list(
        &self,
        filter: &NewsFilter,
        page: PageRequest,
    ) -> Result<Page<News>, NewsPersistenceError> {
        let mut articles: Vec<News> = read(&self.articles)
            .values()
            .filter(|article| filter.accepts(article))
            .cloned()
            .collect();
        articles.sort_by(newest_first);
        Ok(paginate(articles, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use rstest::rstest;

    use crate::domain::{AdminId, NewsDraft, NewsPatch};

    fn article(title: &str, slug: &str, status: &str, minutes: i64) -> News {
        let now = DateTime::<Utc>::UNIX_EPOCH + TimeDelta::minutes(minutes);
        let draft = NewsDraft::try_new(title, None, "Body text.", "general", None, Some(status))
            .expect("valid draft");
        News::new(NewsId::random(), slug.into(), draft, AdminId::random(), None, now)
    }

    #[rstest]
    #[tokio::test]
    async fn slugs_are_unique() {
        let repo = MemoryNewsRepository::new();
        repo.insert(&article("Eagles win again", "eagles-win", "published", 0))
            .await
            .expect("insert");
        let err = repo
            .insert(&article("Eagles win again!", "eagles-win", "draft", 1))
            .await
            .expect_err("duplicate slug");
        assert_eq!(err, NewsPersistenceError::duplicate_slug("eagles-win"));
        assert!(repo.slug_exists("eagles-win").await.expect("query"));
    }

    #[rstest]
    #[tokio::test]
    async fn views_are_only_recorded_for_published_articles() {
        let repo = MemoryNewsRepository::new();
        repo.insert(&article("Published story", "published-story", "published", 0))
            .await
            .expect("insert");
        repo.insert(&article("Draft story here", "draft-story", "draft", 0))
            .await
            .expect("insert");

        let viewed = repo.record_view("published-story").await.expect("view");
        assert_eq!(viewed.map(|a| a.views), Some(1));
        assert!(repo.record_view("draft-story").await.expect("view").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn list_puts_recent_publications_first() {
        let repo = MemoryNewsRepository::new();
        repo.insert(&article("Older story", "older", "published", 0))
            .await
            .expect("insert");
        repo.insert(&article("Newer story", "newer", "published", 10))
            .await
            .expect("insert");
        repo.insert(&article("Draft story", "draft", "draft", 20))
            .await
            .expect("insert");

        let public = repo
            .list(&NewsFilter::default(), PageRequest::default())
            .await
            .expect("list");
        let slugs: Vec<_> = public.data.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, ["newer", "older"]);

        let staff = NewsFilter {
            include_drafts: true,
            ..NewsFilter::default()
        };
        let everything = repo.list(&staff, PageRequest::default()).await.expect("list");
        assert_eq!(everything.data.last().map(|a| a.slug.as_str()), Some("draft"));
    }

    #[rstest]
    #[tokio::test]
    async fn edits_keep_views_and_likes_recorded_since_the_read() {
        let repo = MemoryNewsRepository::new();
        let original = article("Eagles squad named", "eagles-squad", "published", 0);
        repo.insert(&original).await.expect("insert");
        let mut edited = repo
            .find_by_id(&original.id)
            .await
            .expect("find")
            .expect("stored");
        let read_at = edited.updated_at;

        for _ in 0..3 {
            repo.record_view("eagles-squad").await.expect("view");
        }
        let fan = UserId::random();
        let liked = repo
            .toggle_like(&original.id, &fan)
            .await
            .expect("like")
            .expect("published");
        assert_eq!(liked, LikeOutcome { liked: true, likes: 1 });

        let patch = NewsPatch::try_new(Some("Eagles squad confirmed"), None, None, None, None, None)
            .expect("valid patch");
        edited.apply(patch, None, read_at + TimeDelta::minutes(1));
        assert!(repo.update(&edited, read_at).await.expect("update"));

        let stored = repo
            .find_by_id(&original.id)
            .await
            .expect("find")
            .expect("stored");
        assert_eq!(stored.title, "Eagles squad confirmed");
        assert_eq!(stored.views, 3);
        assert_eq!(stored.likes, vec![fan]);
    }

    #[rstest]
    #[tokio::test]
    async fn second_edit_from_the_same_read_is_stale() {
        let repo = MemoryNewsRepository::new();
        let original = article("Derby preview", "derby-preview", "draft", 0);
        repo.insert(&original).await.expect("insert");
        let read_at = original.updated_at;

        let mut first = original.clone();
        first.summary = Some("Kano Pillars host Enyimba".into());
        first.updated_at = read_at + TimeDelta::seconds(1);
        assert!(repo.update(&first, read_at).await.expect("first"));

        let mut second = original.clone();
        second.summary = Some("Lost edit".into());
        second.updated_at = read_at + TimeDelta::seconds(2);
        let err = repo.update(&second, read_at).await.expect_err("stale");
        assert_eq!(err, NewsPersistenceError::stale(original.id.to_string()));
        let stored = repo
            .find_by_id(&original.id)
            .await
            .expect("find")
            .expect("stored");
        assert_eq!(stored.summary.as_deref(), Some("Kano Pillars host Enyimba"));
    }

    #[rstest]
    #[tokio::test]
    async fn fans_only_touch_published_articles() {
        let repo = MemoryNewsRepository::new();
        let draft = article("Draft story here", "draft-story", "draft", 0);
        repo.insert(&draft).await.expect("insert");
        let comment = Comment {
            id: CommentId::random(),
            user_id: UserId::random(),
            author_name: "Amaka Nwosu".into(),
            body: "First!".into(),
            created_at: draft.created_at,
        };

        assert!(
            repo.toggle_like(&draft.id, &comment.user_id)
                .await
                .expect("like")
                .is_none()
        );
        assert!(!repo.add_comment(&draft.id, &comment).await.expect("comment"));
        assert!(!repo.remove_comment(&draft.id, &comment.id).await.expect("remove"));
    }
}
