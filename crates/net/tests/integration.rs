//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use flowtidy_errors::NetworkError;
    use flowtidy_net::*;
    use flowtidy_types::{HealthPolicy, HealthStatus};
    use httpmock::prelude::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_probe_healthy_endpoint() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/healthz");
            then.status(200).body("{\"status\":\"ok\"}");
        });

        let result = HttpHealthProbe
            .probe(&server.url("/healthz"), Duration::from_secs(2))
            .await;

        mock.assert();
        assert!(result.is_ok());
        assert_eq!(
            resolve_health(HealthPolicy::Require, result),
            HealthStatus::Healthy
        );
    }

    #[tokio::test]
    async fn test_probe_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/healthz");
            then.status(503);
        });

        let err = HttpHealthProbe
            .probe(&server.url("/healthz"), Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::HttpError { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_probe_slow_endpoint_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/healthz");
            then.status(200).delay(Duration::from_millis(1500));
        });

        let err = HttpHealthProbe
            .probe(&server.url("/healthz"), Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::Timeout { .. }));
    }
}
