//! Port for checking that backing services can take traffic.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Failures reported by readiness probes.
    pub enum ReadinessError {
        /// A dependency did not answer.
        Unavailable { message: String } => "dependency unavailable: {message}",
    }
}

/// Port consulted by the readiness endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Succeed when the dependency answers.
    async fn check(&self) -> Result<(), ReadinessError>;
}
