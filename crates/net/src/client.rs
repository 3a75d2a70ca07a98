//! HTTP client with retry logic

use flowtidy_errors::NetworkError;
use reqwest::{Client, Response};
use std::time::Duration;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            retry_count: 2,
            retry_delay: Duration::from_millis(500),
            user_agent: format!("flowtidy/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl NetConfig {
    /// Single attempt, both timeouts capped at `timeout`
    #[must_use]
    pub fn single_shot(timeout: Duration) -> Self {
        Self {
            timeout,
            connect_timeout: timeout,
            retry_count: 0,
            ..Self::default()
        }
    }
}

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::ClientSetup` if the underlying reqwest client
    /// fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ClientSetup(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Execute a GET request with retries
    ///
    /// Any HTTP status is returned as a response; only transport failures
    /// are errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all retry attempts.
    pub async fn get(&self, url: &str) -> Result<Response, NetworkError> {
        self.retry_request(url, || self.client.get(url).send())
            .await
    }

    async fn retry_request<F, Fut>(&self, url: &str, mut f: F) -> Result<Response, NetworkError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<Response, reqwest::Error>>,
    {
        let mut attempt = 0;
        loop {
            match f().await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.config.retry_count && Self::should_retry(&e) => {
                    attempt += 1;
                    tracing::debug!(url, attempt, error = %e, "retrying request");
                    tokio::time::sleep(self.config.retry_delay * attempt).await;
                }
                Err(e) => return Err(Self::classify(url, &e)),
            }
        }
    }

    fn should_retry(error: &reqwest::Error) -> bool {
        error.is_timeout() || error.is_connect()
    }

    fn classify(url: &str, error: &reqwest::Error) -> NetworkError {
        if error.is_timeout() {
            NetworkError::Timeout {
                url: url.to_string(),
            }
        } else if error.is_builder() {
            NetworkError::InvalidUrl(url.to_string())
        } else {
            NetworkError::ConnectionRefused(format!("{url}: {error}"))
        }
    }
}
