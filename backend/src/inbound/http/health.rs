//! `/health/live` and `/health/ready` probes.
//!
//! Liveness only proves the workers answer. Readiness additionally waits for
//! start-up to finish and, when a database backs the repositories, for the
//! pool to hand out a working connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::ports::ReadinessProbe;

/// Probe body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// `alive`, `ready`, `starting` or `unavailable`.
    #[schema(example = "ready")]
    pub status: &'static str,
}

/// Start-up flag plus the optional dependency check behind readiness.
#[derive(Default)]
pub struct HealthState {
    started: AtomicBool,
    probe: Option<Arc<dyn ReadinessProbe>>,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate readiness on `probe` as well as start-up.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn ReadinessProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Record that the listener is bound.
    pub fn mark_started(&self) {
        self.started.store(true, Ordering::Release);
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    async fn readiness(&self) -> &'static str {
        if !self.is_started() {
            return "starting";
        }
        match &self.probe {
            None => "ready",
            Some(probe) => match probe.check().await {
                Ok(()) => "ready",
                Err(error) => {
                    warn!(%error, "readiness probe failed");
                    "unavailable"
                }
            },
        }
    }
}

fn report(status: &'static str) -> HttpResponse {
    let mut builder = match status {
        "alive" | "ready" => HttpResponse::Ok(),
        _ => HttpResponse::ServiceUnavailable(),
    };
    builder
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(HealthReport { status })
}

/// Readiness: 200 once start-up finished and the database answers.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Accepting traffic", body = HealthReport),
        (status = 503, description = "Starting up or database unreachable", body = HealthReport)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    report(state.readiness().await)
}

/// Liveness: 200 whenever a worker can answer.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Process is serving", body = HealthReport))
)]
#[get("/health/live")]
pub async fn live() -> HttpResponse {
    report("alive")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};
    use rstest::rstest;
    use serde_json::Value;

    use crate::domain::ports::{MockReadinessProbe, ReadinessError};

    async fn probe(state: HealthState, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(ready)
                .service(live),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(
            res.headers()
                .get(header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("no-store")
        );
        let status = res.status();
        (status, test::read_body_json(res).await)
    }

    fn started(state: HealthState) -> HealthState {
        state.mark_started();
        state
    }

    #[rstest]
    #[actix_web::test]
    async fn reports_starting_until_the_listener_is_bound() {
        let (status, body) = probe(HealthState::new(), "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "starting");

        let (status, body) = probe(started(HealthState::new()), "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }

    #[rstest]
    #[case(Ok(()), StatusCode::OK, "ready")]
    #[case(
        Err(ReadinessError::unavailable("connection refused")),
        StatusCode::SERVICE_UNAVAILABLE,
        "unavailable"
    )]
    #[actix_web::test]
    async fn readiness_follows_the_database(
        #[case] outcome: Result<(), ReadinessError>,
        #[case] expected: StatusCode,
        #[case] label: &str,
    ) {
        let mut check = MockReadinessProbe::new();
        check.expect_check().times(1).return_once(move || outcome);
        let state = started(HealthState::new().with_probe(Arc::new(check)));

        let (status, body) = probe(state, "/health/ready").await;
        assert_eq!(status, expected);
        assert_eq!(body["status"], label);
    }

    #[rstest]
    #[actix_web::test]
    async fn liveness_does_not_wait_for_start_up() {
        let (status, body) = probe(HealthState::new(), "/health/live").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "alive");
    }
}
