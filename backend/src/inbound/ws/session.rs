//! Per-connection WebSocket handler.
//!
//! Forwards match updates from the `MatchUpdateFeed` port to one client,
//! optionally narrowed to a single fixture. The public contract pings every
//! 5s and considers a connection idle after 10s without client traffic.
//! Tests shorten both intervals.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time;
use tracing::{debug, warn};

use crate::domain::{MatchId, MatchUpdate};
use crate::inbound::ws::messages::{ClientRequest, ServerMessage};

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(
    updates: broadcast::Receiver<MatchUpdate>,
    session: Session,
    stream: MessageStream,
) {
    WsSession::default().run(updates, session, stream).await;
}

/// Reasons a session loop stops.
enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    FeedClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    InvalidPayload,
    Network(Closed),
}

/// Connection state: `None` forwards every fixture.
#[derive(Debug, Default)]
struct WsSession {
    subscription: Option<MatchId>,
}

impl WsSession {
    async fn run(
        &mut self,
        mut updates: broadcast::Receiver<MatchUpdate>,
        mut session: Session,
        mut stream: MessageStream,
    ) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    handle_heartbeat_tick(&mut session, last_heartbeat).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
                update = updates.recv() => {
                    self.handle_update(&mut session, update).await
                }
            };

            if let Err(error) = result {
                error.finish(session).await;
                return;
            }
        }
    }

    async fn handle_stream_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message.map_err(SessionError::Protocol)? {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session.pong(&payload).await.map_err(SessionError::Network)
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                self.handle_request(session, text.as_ref()).await
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_request(&mut self, session: &mut Session, text: &str) -> Result<(), SessionError> {
        let request = serde_json::from_str::<ClientRequest>(text).map_err(|error| {
            warn!(error = %error, "Rejected malformed WebSocket payload");
            SessionError::InvalidPayload
        })?;

        let ack = match request {
            ClientRequest::Subscribe { match_id } => {
                self.subscription = Some(match_id);
                ServerMessage::Subscribed { match_id }
            }
            ClientRequest::Unsubscribe => {
                self.subscription = None;
                ServerMessage::Unsubscribed
            }
        };
        send_json(session, &ack).await.map_err(SessionError::Network)
    }

    async fn handle_update(
        &self,
        session: &mut Session,
        update: Result<MatchUpdate, RecvError>,
    ) -> Result<(), SessionError> {
        match update {
            Ok(update) if self.wants(update.match_id) => {
                send_json(session, &ServerMessage::MatchUpdate(&update))
                    .await
                    .map_err(SessionError::Network)
            }
            Ok(_) => Ok(()),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "WebSocket client fell behind; dropping match updates");
                Ok(())
            }
            Err(RecvError::Closed) => Err(SessionError::FeedClosed),
        }
    }

    fn wants(&self, match_id: MatchId) -> bool {
        self.subscription.is_none_or(|subscribed| subscribed == match_id)
    }
}

async fn handle_heartbeat_tick(
    session: &mut Session,
    last_heartbeat: Instant,
) -> Result<(), SessionError> {
    if Instant::now().duration_since(last_heartbeat) > CLIENT_TIMEOUT {
        return Err(SessionError::HeartbeatTimeout);
    }
    session.ping(b"").await.map_err(SessionError::Network)
}

async fn send_json<T: serde::Serialize>(session: &mut Session, payload: &T) -> Result<(), Closed> {
    match serde_json::to_string(payload) {
        Ok(body) => session.text(body).await,
        Err(error) => {
            warn!(error = %error, "Failed to serialize WebSocket payload");
            Ok(())
        }
    }
}

impl SessionError {
    /// The close frame owed to the client, if the connection is still usable.
    fn close_reason(&self) -> Option<Option<CloseReason>> {
        let reason = |code, description: &str| {
            Some(Some(CloseReason {
                code,
                description: Some(description.to_owned()),
            }))
        };
        match self {
            Self::HeartbeatTimeout => reason(CloseCode::Normal, "heartbeat timeout"),
            Self::Protocol(_) => reason(CloseCode::Protocol, "protocol error"),
            Self::InvalidPayload => reason(CloseCode::Policy, "invalid payload"),
            Self::FeedClosed => reason(CloseCode::Away, "server shutting down"),
            Self::ClientClosed(echo) => Some(echo.clone()),
            Self::StreamClosed | Self::Network(_) => None,
        }
    }

    /// Log why the session ended and send the matching close frame.
    async fn finish(self, session: Session) {
        match &self {
            Self::HeartbeatTimeout => warn!("client stopped answering pings; closing match feed"),
            Self::Protocol(error) => warn!(%error, "WebSocket protocol error"),
            Self::Network(error) => warn!(%error, "match update send failed"),
            Self::FeedClosed => debug!("match update feed closed; ending WebSocket session"),
            Self::InvalidPayload | Self::ClientClosed(_) | Self::StreamClosed => {}
        }
        if let Some(reason) = self.close_reason() {
            if let Err(error) = session.close(reason).await {
                warn!(%error, "failed to close WebSocket session");
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
