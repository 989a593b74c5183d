//! Client configuration.

/// Configuration for a [`BatchClient`](crate::client::BatchClient).
///
/// # Examples
///
/// ```
/// use storage_batch_http::client::ClientConfig;
///
/// let config = ClientConfig {
///     max_retries: 5,
///     retry_delay_ms: 2000,
///     ..Default::default()
/// };
/// assert_eq!(config.max_retries, 5);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for the outer batch exchange, in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum idle connections kept per host
    pub max_idle_connections: u32,
    /// Retry budget for the outer exchange (sub-requests are never retried)
    pub max_retries: u32,
    /// Base delay for exponential backoff between retries, in milliseconds
    pub retry_delay_ms: u64,
    /// User-Agent sent with the outer request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            request_timeout_ms: 30_000,
            max_idle_connections: 8,
            max_retries: 3,
            retry_delay_ms: 1_000,
            user_agent: format!("storage-batch-http/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_ms, 1_000);
        assert!(config.user_agent.starts_with("storage-batch-http/"));
    }
}
