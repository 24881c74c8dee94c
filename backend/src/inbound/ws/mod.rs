//! WebSocket inbound adapter streaming live match updates.
//!
//! `GET /ws` upgrades browsers whose `Origin` is on the configured
//! allow-list. Each connection receives its own subscription to the match
//! update feed and runs as a spawned session task.

use actix_web::http::header::{HeaderMap, ORIGIN};
use actix_web::web::{self, Payload};
use actix_web::{HttpRequest, HttpResponse, get};
use tracing::{debug, warn};
use url::Url;

use crate::inbound::ws::state::{AllowedOrigins, WsState};

mod session;

pub mod messages;
pub mod state;

/// Why an upgrade request was refused before the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
enum OriginRejection {
    #[error("Origin header missing")]
    Missing,
    #[error("Origin header repeated")]
    Repeated,
    #[error("Origin header is not a valid origin")]
    Malformed,
    #[error("Origin not allowed")]
    NotAllowed,
}

impl OriginRejection {
    fn into_error(self) -> actix_web::Error {
        match self {
            Self::Missing | Self::NotAllowed => actix_web::error::ErrorForbidden(self),
            Self::Repeated | Self::Malformed => actix_web::error::ErrorBadRequest(self),
        }
    }
}

/// Check the single `Origin` header of `headers` against `allowed`.
fn check_origin(allowed: &AllowedOrigins, headers: &HeaderMap) -> Result<(), OriginRejection> {
    let mut values = headers.get_all(ORIGIN);
    let value = values.next().ok_or(OriginRejection::Missing)?;
    if values.next().is_some() {
        return Err(OriginRejection::Repeated);
    }
    let raw = value.to_str().map_err(|_| OriginRejection::Malformed)?;
    let origin = Url::parse(raw).map_err(|_| OriginRejection::Malformed)?;
    if allowed.allows(&origin) {
        Ok(())
    } else {
        Err(OriginRejection::NotAllowed)
    }
}

/// Upgrade to a WebSocket streaming [`crate::domain::MatchUpdate`] frames.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    if let Err(rejection) = check_origin(&state.origins, req.headers()) {
        warn!(
            origin = ?req.headers().get(ORIGIN),
            reason = %rejection,
            "WebSocket upgrade refused"
        );
        return Err(rejection.into_error());
    }

    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|error| {
        warn!(%error, "WebSocket handshake failed");
        actix_web::error::ErrorBadRequest("WebSocket upgrade failed")
    })?;
    let updates = state.feed.subscribe();
    debug!(peer = ?req.peer_addr(), "WebSocket client subscribed to match updates");
    actix_web::rt::spawn(session::handle_ws_session(updates, session, messages));
    Ok(response)
}
