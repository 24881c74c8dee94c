//! Article HTTP handlers.
//!
//! ```text
//! GET    /api/news
//! GET    /api/news/admin
//! GET    /api/news/slug/{slug}
//! GET    /api/news/{id}
//! POST   /api/news
//! PUT    /api/news/{id}
//! DELETE /api/news/{id}
//! POST   /api/news/{id}/like
//! POST   /api/news/{id}/comments
//! DELETE /api/news/{id}/comments/{commentId}
//! ```
//!
//! Article writes arrive as `multipart/form-data` with text fields `title`,
//! `summary`, `content`, `category`, `tags` (comma separated) and `status`,
//! plus an optional `image` file.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, Scope, delete, get, post, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{ImageFolder, LikeOutcome};
use crate::domain::{
    Comment, CommentBody, CommentId, Error, News, NewsCategory, NewsDraft, NewsFilter, NewsId,
    NewsPatch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{
    Authenticated, AuthenticatedAdmin, AuthenticatedUser, OptionalPrincipal,
};
use crate::inbound::http::multipart::read_upload_form;
use crate::inbound::http::schemas::NewsPage;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{non_blank, page_request, parse_id};

/// Multipart field carrying the article image.
const IMAGE_FIELD: &str = "image";

/// Filters for article lists.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NewsListQuery {
    /// Category name such as `transfer` or `match_report`.
    pub category: Option<String>,
    pub tag: Option<String>,
    /// Substring of the title.
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl NewsListQuery {
    fn into_filter(self, include_drafts: bool) -> Result<NewsFilter, Error> {
        let category = non_blank(self.category)
            .map(|raw| NewsCategory::parse(&raw))
            .transpose()?;
        Ok(NewsFilter {
            category,
            tag: non_blank(self.tag).map(|tag| tag.to_lowercase()),
            search: non_blank(self.search),
            include_drafts,
        })
    }
}

/// Comment body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CommentRequest {
    #[serde(default)]
    #[schema(example = "What a signing!")]
    pub body: String,
}

fn news_id(raw: &str) -> Result<NewsId, Error> {
    parse_id(raw, "id", NewsId::parse)
}

async fn list_with(
    state: &HttpState,
    query: NewsListQuery,
    include_drafts: bool,
) -> ApiResult<web::Json<Page<News>>> {
    let page = page_request(query.page, query.limit)?;
    let filter = query.into_filter(include_drafts)?;
    Ok(web::Json(state.news_query.list(filter, page).await?))
}

/// Published articles, newest first.
#[utoipa::path(
    get,
    path = "/api/news",
    params(NewsListQuery),
    responses(
        (status = 200, description = "Articles", body = NewsPage),
        (status = 400, description = "Invalid filter or paging", body = Error)
    ),
    tags = ["news"],
    operation_id = "listNews",
    security([])
)]
#[get("")]
pub async fn list_news(
    state: web::Data<HttpState>,
    query: web::Query<NewsListQuery>,
) -> ApiResult<web::Json<Page<News>>> {
    list_with(&state, query.into_inner(), false).await
}

/// Every article, drafts included.
#[utoipa::path(
    get,
    path = "/api/news/admin",
    params(NewsListQuery),
    responses(
        (status = 200, description = "Articles", body = NewsPage),
        (status = 403, description = "Staff only", body = Error)
    ),
    tags = ["news"],
    operation_id = "listNewsForStaff"
)]
#[get("/admin")]
pub async fn list_all_news(
    state: web::Data<HttpState>,
    _caller: AuthenticatedAdmin,
    query: web::Query<NewsListQuery>,
) -> ApiResult<web::Json<Page<News>>> {
    list_with(&state, query.into_inner(), true).await
}

/// Published article by slug; counts a view.
#[utoipa::path(
    get,
    path = "/api/news/slug/{slug}",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Article", body = News),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["news"],
    operation_id = "getNewsBySlug",
    security([])
)]
#[get("/slug/{slug}")]
pub async fn news_by_slug(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<News>> {
    Ok(web::Json(state.news_query.by_slug(path.into_inner()).await?))
}

/// Article by id. Drafts are visible to staff only.
#[utoipa::path(
    get,
    path = "/api/news/{id}",
    params(("id" = String, Path, description = "Article id")),
    responses(
        (status = 200, description = "Article", body = News),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["news"],
    operation_id = "getNews",
    security((), ("bearer" = []))
)]
#[get("/{id}")]
pub async fn news_by_id(
    state: web::Data<HttpState>,
    caller: OptionalPrincipal,
    path: web::Path<String>,
) -> ApiResult<web::Json<News>> {
    let id = news_id(&path.into_inner())?;
    let include_drafts = caller.0.is_some_and(|p| p.role().is_staff());
    Ok(web::Json(state.news_query.by_id(id, include_drafts).await?))
}

/// Publish or draft an article.
#[utoipa::path(
    post,
    path = "/api/news",
    request_body(content_type = "multipart/form-data", description = "Article fields and optional `image`"),
    responses(
        (status = 201, description = "Article created", body = News),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Staff only", body = Error),
        (status = 409, description = "No free slug for the title", body = Error),
        (status = 503, description = "Image storage unavailable", body = Error)
    ),
    tags = ["news"],
    operation_id = "createNews"
)]
#[post("")]
pub async fn create_news(
    state: web::Data<HttpState>,
    caller: AuthenticatedAdmin,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let mut form = read_upload_form(payload, IMAGE_FIELD, ImageFolder::News).await?;
    let draft = NewsDraft::try_new(
        form.text("title").unwrap_or_default(),
        form.text("summary"),
        form.text("content").unwrap_or_default(),
        form.text("category").unwrap_or_default(),
        form.text("tags"),
        form.text("status"),
    )?;
    let image = form.take_image();
    let article = state.news.create(caller.id(), draft, image).await?;
    Ok(HttpResponse::Created().json(article))
}

/// Update an article; the slug is kept.
#[utoipa::path(
    put,
    path = "/api/news/{id}",
    params(("id" = String, Path, description = "Article id")),
    request_body(content_type = "multipart/form-data", description = "Fields to change and optional `image`"),
    responses(
        (status = 200, description = "Article updated", body = News),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["news"],
    operation_id = "updateNews"
)]
#[put("/{id}")]
pub async fn update_news(
    state: web::Data<HttpState>,
    _caller: AuthenticatedAdmin,
    path: web::Path<String>,
    payload: Multipart,
) -> ApiResult<web::Json<News>> {
    let id = news_id(&path.into_inner())?;
    let mut form = read_upload_form(payload, IMAGE_FIELD, ImageFolder::News).await?;
    let patch = NewsPatch::try_new(
        form.text("title"),
        form.text("summary"),
        form.text("content"),
        form.text("category"),
        form.text("tags"),
        form.text("status"),
    )?;
    let image = form.take_image();
    Ok(web::Json(state.news.update(id, patch, image).await?))
}

/// Delete an article.
#[utoipa::path(
    delete,
    path = "/api/news/{id}",
    params(("id" = String, Path, description = "Article id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["news"],
    operation_id = "deleteNews"
)]
#[delete("/{id}")]
pub async fn delete_news(
    state: web::Data<HttpState>,
    _caller: AuthenticatedAdmin,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = news_id(&path.into_inner())?;
    state.news.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Like or unlike a published article.
#[utoipa::path(
    post,
    path = "/api/news/{id}/like",
    params(("id" = String, Path, description = "Article id")),
    responses(
        (status = 200, description = "Like toggled", body = LikeOutcome),
        (status = 403, description = "Fans only", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["news"],
    operation_id = "toggleNewsLike"
)]
#[post("/{id}/like")]
pub async fn toggle_like(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<LikeOutcome>> {
    let id = news_id(&path.into_inner())?;
    Ok(web::Json(state.news.toggle_like(id, caller.0).await?))
}

/// Comment on a published article.
#[utoipa::path(
    post,
    path = "/api/news/{id}/comments",
    params(("id" = String, Path, description = "Article id")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment added", body = Comment),
        (status = 400, description = "Invalid comment", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["news"],
    operation_id = "addNewsComment"
)]
#[post("/{id}/comments")]
pub async fn add_comment(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let id = news_id(&path.into_inner())?;
    let body = CommentBody::new(&payload.into_inner().body)?;
    let comment = state.news.add_comment(id, caller.0, body).await?;
    Ok(HttpResponse::Created().json(comment))
}

/// Delete a comment; its author or any staff member may do so.
#[utoipa::path(
    delete,
    path = "/api/news/{id}/comments/{commentId}",
    params(
        ("id" = String, Path, description = "Article id"),
        ("commentId" = String, Path, description = "Comment id")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Article or comment not found", body = Error)
    ),
    tags = ["news"],
    operation_id = "deleteNewsComment"
)]
#[delete("/{id}/comments/{comment_id}")]
pub async fn delete_comment(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (raw_id, raw_comment) = path.into_inner();
    let id = news_id(&raw_id)?;
    let comment_id = parse_id(&raw_comment, "commentId", CommentId::parse)?;
    state.news.delete_comment(id, comment_id, caller.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Routes under `/api/news`.
///
/// Literal segments are registered before `/{id}`.
pub fn scope() -> Scope {
    web::scope("/api/news")
        .service(list_news)
        .service(create_news)
        .service(list_all_news)
        .service(news_by_slug)
        .service(news_by_id)
        .service(update_news)
        .service(delete_news)
        .service(toggle_like)
        .service(add_comment)
        .service(delete_comment)
}

#[cfg(test)]
#[path = "news_tests.rs"]
mod tests;
