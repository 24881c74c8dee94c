//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST handler under `/api`, the health probes,
//! the list envelopes from [`crate::inbound::http::schemas`] and the
//! `bearer` JWT security scheme. Handlers that accept anonymous callers
//! override the document-wide requirement with `security([])`.
//!
//! The generated document is served by Swagger UI in debug builds and
//! exported by the `openapi-dump` binary for external tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::LikeOutcome;
use crate::domain::{
    Admin, AdminRole, Comment, Error, ErrorCode, Match, MatchUpdate, MatchUpdateKind, News, Role,
    User,
};
use crate::inbound::http::schemas::{AdminPage, MatchPage, NewsPage, UserPage};
use crate::inbound::http::health::{self, HealthReport};
use crate::inbound::http::{admins, matches, news, users};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Token returned by the user or admin login and register endpoints.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Pitchside backend API",
        description = "Nigerian football news, fixtures and live match centre."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("bearer" = [])),
    paths(
        users::register,
        users::login,
        users::profile,
        users::update_profile,
        users::update_avatar,
        users::change_password,
        users::forgot_password,
        users::reset_password,
        users::delete_account,
        admins::register,
        admins::login,
        admins::profile,
        admins::change_password,
        admins::forgot_password,
        admins::reset_password,
        admins::list_users,
        admins::get_user,
        admins::delete_user,
        admins::list_admins,
        admins::delete_admin,
        matches::list_matches,
        matches::live_matches,
        matches::get_match,
        matches::create_match,
        matches::update_match,
        matches::update_score,
        matches::update_status,
        matches::add_event,
        matches::remove_event,
        matches::update_lineups,
        matches::update_stats,
        matches::delete_match,
        news::list_news,
        news::list_all_news,
        news::news_by_slug,
        news::news_by_id,
        news::create_news,
        news::update_news,
        news::delete_news,
        news::toggle_like,
        news::add_comment,
        news::delete_comment,
        health::ready,
        health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        AdminRole,
        User,
        Admin,
        Match,
        MatchUpdate,
        MatchUpdateKind,
        News,
        Comment,
        LikeOutcome,
        UserPage,
        AdminPage,
        MatchPage,
        NewsPage,
        HealthReport,
    )),
    tags(
        (name = "users", description = "Fan accounts and profiles"),
        (name = "admins", description = "Staff accounts and user management"),
        (name = "matches", description = "Fixtures, scores and match events"),
        (name = "news", description = "Articles, likes and comments"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::path::HttpMethod;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", &["code", "message", "traceId", "details"])]
    #[case("User", &["id", "firstName", "email", "favouriteTeams", "followedStates"])]
    #[case("Match", &["homeTeam", "awayTeam", "status", "events", "kickoff"])]
    #[case("News", &["slug", "title", "category", "likes", "comments"])]
    #[case("MatchPage", &["data", "page", "limit", "total", "totalPages"])]
    fn schemas_use_camel_case_fields(#[case] name: &str, #[case] fields: &[&str]) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");
        for field in fields {
            assert_object_schema_has_field(schema, field);
        }
    }

    #[rstest]
    #[case("/api/user/register", HttpMethod::Post)]
    #[case("/api/admin/admins/{id}", HttpMethod::Delete)]
    #[case("/api/matches/{id}/events/{eventId}", HttpMethod::Delete)]
    #[case("/api/news/{id}/comments", HttpMethod::Post)]
    #[case("/health/ready", HttpMethod::Get)]
    fn documents_routes(#[case] path: &str, #[case] method: HttpMethod) {
        let doc = ApiDoc::openapi();
        let item = doc.paths.paths.get(path).expect("path documented");
        let operation = match method {
            HttpMethod::Get => item.get.as_ref(),
            HttpMethod::Post => item.post.as_ref(),
            HttpMethod::Delete => item.delete.as_ref(),
            _ => None,
        };
        assert!(operation.is_some(), "{method:?} {path} documented");
    }

    #[rstest]
    fn registers_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
