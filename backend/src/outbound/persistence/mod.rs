//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` and `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain aggregates. No business rules live here.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Typed errors**: database failures become the port's persistence error.
//!
//! # Example
//!
//! ```ignore
//! use pitchside::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/pitchside")).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_admin_repository;
mod diesel_basic_error_mapping;
mod diesel_helpers;
mod diesel_match_repository;
mod diesel_news_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_admin_repository::DieselAdminRepository;
pub use diesel_match_repository::DieselMatchRepository;
pub use diesel_news_repository::DieselNewsRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
