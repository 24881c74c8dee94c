//! HS256 JWT implementation of the [`TokenService`] port.
//!
//! Claims are `sub` (account UUID), `role`, `iat` and `exp`. Expiry is
//! checked against the injected clock rather than the system time so tests
//! can move time forward.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{IssuedToken, Principal, Role};

/// Shortest secret accepted for signing.
pub const MIN_SECRET_LEN: usize = 32;

const DEVELOPMENT_SECRET: &str = "pitchside-development-secret-do-not-deploy";

/// Rejected signing configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwtConfigError {
    /// The secret is shorter than [`MIN_SECRET_LEN`].
    #[error("JWT secret must be at least {MIN_SECRET_LEN} characters")]
    SecretTooShort,
    /// Tokens must live for a positive duration.
    #[error("JWT lifetime must be positive")]
    NonPositiveTtl,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    role: Role,
    iat: i64,
    exp: i64,
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwtTokenService {
    /// Build a token service from a configured secret.
    pub fn new(secret: &str, ttl: TimeDelta, clock: Arc<dyn Clock>) -> Result<Self, JwtConfigError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtConfigError::SecretTooShort);
        }
        if ttl <= TimeDelta::zero() {
            return Err(JwtConfigError::NonPositiveTtl);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            clock,
        })
    }

    /// Token service with a fixed, publicly known secret for local runs.
    pub fn development(ttl: TimeDelta, clock: Arc<dyn Clock>) -> Result<Self, JwtConfigError> {
        Self::new(DEVELOPMENT_SECRET, ttl, clock)
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims =
            HashSet::from(["exp".to_owned(), "sub".to_owned()]);
        validation
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, principal: Principal) -> Result<IssuedToken, TokenError> {
        let now = self.clock.utc();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: principal.subject(),
            role: principal.role(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))?;
        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Self::validation()).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::expired(),
                ErrorKind::InvalidSignature => TokenError::invalid("bad signature"),
                _ => TokenError::invalid(err.to_string()),
            }
        })?;
        let expires_at = DateTime::<Utc>::from_timestamp(data.claims.exp, 0)
            .ok_or_else(|| TokenError::invalid("exp is out of range"))?;
        if expires_at <= self.clock.utc() {
            return Err(TokenError::expired());
        }
        Ok(Principal::new(data.claims.sub, data.claims.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    use crate::domain::{AdminId, UserId};
    use crate::test_support::MutableClock;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        Arc::new(MutableClock::new(Utc::now()))
    }

    fn service(clock: &Arc<MutableClock>) -> JwtTokenService {
        JwtTokenService::new(SECRET, TimeDelta::days(7), clock.clone()).expect("valid config")
    }

    #[rstest]
    fn issued_tokens_verify_to_the_same_principal(clock: Arc<MutableClock>) {
        let tokens = service(&clock);
        let principal = Principal::admin(AdminId::random(), Role::SuperAdmin);
        let issued = tokens.issue(principal).expect("issue");
        assert_eq!(issued.expires_at, clock.utc() + TimeDelta::days(7));
        assert_eq!(tokens.verify(&issued.token).expect("verify"), principal);
    }

    #[rstest]
    fn tokens_expire_with_the_clock(clock: Arc<MutableClock>) {
        let tokens = service(&clock);
        let issued = tokens.issue(Principal::user(UserId::random())).expect("issue");
        clock.advance(TimeDelta::days(7));
        assert_eq!(tokens.verify(&issued.token), Err(TokenError::Expired));
    }

    #[rstest]
    fn tokens_from_another_secret_are_invalid(clock: Arc<MutableClock>) {
        let other = JwtTokenService::development(TimeDelta::days(1), clock.clone())
            .expect("valid config");
        let issued = other.issue(Principal::user(UserId::random())).expect("issue");
        assert!(matches!(
            service(&clock).verify(&issued.token),
            Err(TokenError::Invalid { .. })
        ));
    }

    #[rstest]
    #[case("garbage")]
    #[case("")]
    #[case("a.b.c")]
    fn garbled_tokens_are_invalid(clock: Arc<MutableClock>, #[case] token: &str) {
        assert!(matches!(
            service(&clock).verify(token),
            Err(TokenError::Invalid { .. })
        ));
    }

    #[rstest]
    #[case("short", TimeDelta::days(1), JwtConfigError::SecretTooShort)]
    #[case(SECRET, TimeDelta::zero(), JwtConfigError::NonPositiveTtl)]
    fn rejects_weak_configuration(
        clock: Arc<MutableClock>,
        #[case] secret: &str,
        #[case] ttl: TimeDelta,
        #[case] expected: JwtConfigError,
    ) {
        let err = JwtTokenService::new(secret, ttl, clock).expect_err("rejected");
        assert_eq!(err, expected);
    }
}
