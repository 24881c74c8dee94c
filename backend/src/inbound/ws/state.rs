//! Shared WebSocket adapter state.
//!
//! Sessions depend on the [`MatchUpdateFeed`] port rather than the concrete
//! broadcast hub so tests can drive them with any feed.

use std::sync::Arc;

use url::{Origin, Url};

use crate::domain::ports::MatchUpdateFeed;

/// Browser origins permitted to open `/ws`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedOrigins {
    origins: Vec<Origin>,
}

impl AllowedOrigins {
    /// Parse origins such as `https://pitchside.ng` or `http://localhost:3000`.
    ///
    /// # Errors
    /// Returns [`url::ParseError`] for the first value that is not a URL.
    pub fn parse<I, S>(values: I) -> Result<Self, url::ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let origins = values
            .into_iter()
            .map(|value| Url::parse(value.as_ref().trim()).map(|url| url.origin()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            origins: origins.into_iter().filter(Origin::is_tuple).collect(),
        })
    }

    /// Whether `origin` matches an allowed scheme, host and port.
    pub fn allows(&self, origin: &Url) -> bool {
        let candidate = origin.origin();
        candidate.is_tuple() && self.origins.contains(&candidate)
    }
}

/// Dependency bundle for the WebSocket entry point and sessions.
#[derive(Clone)]
pub struct WsState {
    pub feed: Arc<dyn MatchUpdateFeed>,
    pub origins: AllowedOrigins,
}

impl WsState {
    /// Construct state from a feed and origin allow-list.
    pub fn new(feed: Arc<dyn MatchUpdateFeed>, origins: AllowedOrigins) -> Self {
        Self { feed, origins }
    }
}
