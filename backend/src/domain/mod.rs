//! Domain primitives, aggregates and use-case services.
//!
//! Purpose: define strongly typed entities for fan and staff accounts,
//! fixtures and news, the validation rules they enforce, and the services
//! that implement the driving ports in [`ports`]. Nothing here depends on
//! actix or Diesel.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error envelope.
//! - User, Admin, Match, News: persisted aggregates.
//! - UserAccountService, AdminAccountService, MatchService, NewsService:
//!   use-case implementations.

pub mod admin;
mod admin_service;
pub mod auth;
pub mod error;
pub mod ids;
pub mod match_update;
pub mod matches;
mod match_service;
pub mod news;
mod news_service;
pub mod ports;
pub mod reference_data;
mod revision;
mod service_support;
pub mod slug;
pub mod trace_id;
pub mod user;
mod user_service;
pub mod validation;

pub use self::service_support::{AccountServiceDeps, AuthSettings};
pub use self::admin::{Admin, AdminAccount, AdminRegistration, AdminRole};
pub use self::admin_service::AdminAccountService;
pub use self::auth::{
    Credentials, Email, IssuedToken, LoginCredentials, Password, PasswordHash, Principal,
    ResetTicket, ResetToken, Role,
};
pub use self::error::{Error, ErrorCode};
pub use self::ids::{AdminId, CommentId, IdParseError, MatchEventId, MatchId, NewsId, UserId};
pub use self::match_service::MatchService;
pub use self::match_update::{MatchUpdate, MatchUpdateKind};
pub use self::matches::{
    EventType, Lineups, Match, MatchDetails, MatchDetailsPatch, MatchEvent, MatchFilter,
    MatchRuleError, MatchStats, MatchStatus, NewMatchEvent, Side, TeamLineup, TeamStats,
};
pub use self::news::{
    Comment, CommentBody, News, NewsCategory, NewsDraft, NewsFilter, NewsPatch, NewsStatus,
    parse_tags,
};
pub use self::news_service::NewsService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{ProfileUpdate, User, UserAccount, UserRegistration};
pub use self::user_service::UserAccountService;
pub use self::validation::ValidationError;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use pitchside::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<u32> {
///     Err(Error::not_found("match not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
