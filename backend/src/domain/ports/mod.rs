//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, hashing, tokens, mail, image storage, live
//! updates) are implemented under `outbound`; driving ports (accounts,
//! fixtures, news) are implemented by the domain services and called by
//! `inbound` adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod admin_accounts;
mod admin_repository;
mod image_store;
mod mailer;
mod match_command;
mod match_repository;
mod match_updates;
mod news_command;
mod news_repository;
mod password_hasher;
mod readiness_probe;
mod token_service;
mod user_accounts;
mod user_repository;

#[cfg(test)]
pub use admin_accounts::MockAdminAccounts;
pub use admin_accounts::{AdminAccounts, AdminSession};
#[cfg(test)]
pub use admin_repository::MockAdminRepository;
pub use admin_repository::{AdminPersistenceError, AdminRepository};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{
    IMAGE_CONTENT_TYPES, IMAGE_MAX_BYTES, ImageFolder, ImageStore, ImageStoreError, ImageUpload,
    UnconfiguredImageStore,
};
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{MailMessage, Mailer, MailerError};
#[cfg(test)]
pub use match_command::{MockMatchCommand, MockMatchQuery};
pub use match_command::{MatchCommand, MatchQuery};
#[cfg(test)]
pub use match_repository::MockMatchRepository;
pub use match_repository::{MatchPersistenceError, MatchRepository};
#[cfg(test)]
pub use match_updates::MockMatchUpdatePublisher;
pub use match_updates::{MatchUpdateFeed, MatchUpdatePublisher};
#[cfg(test)]
pub use news_command::{MockNewsCommand, MockNewsQuery};
pub use news_command::{LikeOutcome, NewsCommand, NewsQuery};
#[cfg(test)]
pub use news_repository::MockNewsRepository;
pub use news_repository::{NewsPersistenceError, NewsRepository};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use readiness_probe::MockReadinessProbe;
pub use readiness_probe::{ReadinessError, ReadinessProbe};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
#[cfg(test)]
pub use user_accounts::MockUserAccounts;
pub use user_accounts::{UserAccounts, UserSession};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
