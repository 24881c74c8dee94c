//! Credential adapters: password hashing and bearer tokens.

mod argon2_hasher;
mod jwt_tokens;

pub use argon2_hasher::Argon2PasswordHasher;
pub use jwt_tokens::{JwtConfigError, JwtTokenService, MIN_SECRET_LEN};
