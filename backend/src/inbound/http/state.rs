//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AdminAccounts, MatchCommand, MatchQuery, NewsCommand, NewsQuery, TokenService, UserAccounts,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserAccounts>,
    pub admins: Arc<dyn AdminAccounts>,
    pub matches: Arc<dyn MatchCommand>,
    pub matches_query: Arc<dyn MatchQuery>,
    pub news: Arc<dyn NewsCommand>,
    pub news_query: Arc<dyn NewsQuery>,
    /// Verifies bearer tokens for the auth extractors.
    pub tokens: Arc<dyn TokenService>,
}
