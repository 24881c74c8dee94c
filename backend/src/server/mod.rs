//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, ServerConfig};

use state_builders::{AppStates, build_states};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer};

use pitchside::Trace;
#[cfg(debug_assertions)]
use pitchside::doc::ApiDoc;
use pitchside::inbound::http::health::{live, ready};
use pitchside::inbound::http::validation::{json_config, query_config};
use pitchside::inbound::{http, ws};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    states: AppStates,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppStates {
        health,
        http: http_state,
        ws: ws_state,
        limiter,
    } = states;

    let app = App::new()
        .app_data(health)
        .app_data(http_state)
        .app_data(ws_state)
        .app_data(json_config())
        .app_data(query_config())
        .wrap(Trace)
        .configure(|cfg| http::configure(cfg, &limiter))
        .service(ws::ws_entry)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server from a validated [`ServerConfig`].
///
/// Readiness is reported once the listener is bound and, when a database
/// is configured, while it answers pings.
///
/// # Errors
/// Propagates [`std::io::Error`] when an adapter cannot be built or the
/// socket cannot be bound.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let states = build_states(&config)?;
    let health = states.health.clone();
    let server = HttpServer::new(move || build_app(states.clone()))
        .bind(config.bind_addr)?
        .run();

    health.mark_started();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Smoke tests for the assembled application.

    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::Value;

    fn memory_states() -> AppStates {
        let config =
            ServerConfig::from_settings(&AppSettings::default()).expect("default settings");
        build_states(&config).expect("states")
    }

    #[rstest]
    #[actix_rt::test]
    async fn wires_public_routes_and_trace_header() {
        let states = memory_states();
        states.health.mark_started();
        let app = test::init_service(build_app(states)).await;

        let response =
            test::call_service(&app, test::TestRequest::get().uri("/api/matches").to_request())
                .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("trace-id"));
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["total"], 0);

        let ready_response = test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request())
            .await;
        assert_eq!(ready_response.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_rt::test]
    async fn protected_routes_require_a_token() {
        let app = test::init_service(build_app(memory_states())).await;
        let response = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/user/profile").to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[cfg(debug_assertions)]
    #[rstest]
    #[actix_rt::test]
    async fn serves_openapi_document_in_debug_builds() {
        let app = test::init_service(build_app(memory_states())).await;
        let response = test::call_service(
            &app,
            test::TestRequest::get().uri("/api-docs/openapi.json").to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
