//! Workflow engine health probing

use async_trait::async_trait;
use flowtidy_errors::NetworkError;
use flowtidy_types::{HealthPolicy, HealthStatus};
use std::time::Duration;

use crate::client::{NetClient, NetConfig};

/// Checks whether the engine's health endpoint answers
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Succeeds only on a 2xx answer within `timeout`
    async fn probe(&self, url: &str, timeout: Duration) -> Result<(), NetworkError>;
}

/// Probes over HTTP with a single attempt
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpHealthProbe;

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn probe(&self, url: &str, timeout: Duration) -> Result<(), NetworkError> {
        let client = NetClient::new(NetConfig::single_shot(timeout))?;
        let response = client.get(url).await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NetworkError::HttpError {
                status: status.as_u16(),
                message: status.to_string(),
            })
        }
    }
}

/// Fold a probe result through the configured policy
///
/// `AssumeAvailable` turns any failure into `Assumed`, so the import batch
/// proceeds and the engine CLI reports real problems per file.
#[must_use]
pub fn resolve_health(policy: HealthPolicy, result: Result<(), NetworkError>) -> HealthStatus {
    match (result, policy) {
        (Ok(()), _) => HealthStatus::Healthy,
        (Err(e), HealthPolicy::AssumeAvailable) => HealthStatus::Assumed {
            reason: e.to_string(),
        },
        (Err(e), HealthPolicy::Require) => HealthStatus::Unreachable {
            reason: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_ignores_policy() {
        assert_eq!(
            resolve_health(HealthPolicy::Require, Ok(())),
            HealthStatus::Healthy
        );
    }

    #[test]
    fn failure_follows_policy() {
        let err = || NetworkError::ConnectionRefused("localhost:5678".into());

        let assumed = resolve_health(HealthPolicy::AssumeAvailable, Err(err()));
        assert!(matches!(assumed, HealthStatus::Assumed { .. }));

        let required = resolve_health(HealthPolicy::Require, Err(err()));
        assert!(matches!(required, HealthStatus::Unreachable { ref reason } if reason.contains("5678")));
    }
}
