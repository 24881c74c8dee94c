//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: in-process repositories for development and tests
//! - **security**: Argon2id password hashing and HS256 bearer tokens
//! - **mail**: HTTP mail API client and a logging fallback
//! - **media**: Cloudinary image uploads
//! - **broadcast**: tokio broadcast hub for live match updates
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod broadcast;
mod http_support;
pub mod mail;
pub mod media;
pub mod memory;
pub mod persistence;
pub mod security;
