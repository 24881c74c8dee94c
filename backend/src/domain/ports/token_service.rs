//! Port for issuing and verifying bearer tokens.

use crate::domain::{IssuedToken, Principal};

use super::define_port_error;

define_port_error! {
    /// Failures raised by token adapters.
    pub enum TokenError {
        /// Token is malformed, has a bad signature, or carries unknown claims.
        Invalid { message: String } => "invalid token: {message}",
        /// Token expired.
        Expired => "token expired",
        /// Signing failed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Port for stateless bearer tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign a token for `principal`.
    fn issue(&self, principal: Principal) -> Result<IssuedToken, TokenError>;

    /// Verify a token and recover its principal.
    fn verify(&self, token: &str) -> Result<Principal, TokenError>;
}
