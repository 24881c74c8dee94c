//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such as
//! tracing and credential endpoint throttling.

pub mod rate_limit;
pub mod trace;

pub use rate_limit::{RateLimit, RateLimitConfig, RateLimiter};
pub use trace::Trace;
