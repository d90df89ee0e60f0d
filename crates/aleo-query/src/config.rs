//! Client configuration.

use std::time::Duration;

use crate::error::ConfigError;

/// Node API path segment used when none is configured.
pub const DEFAULT_NETWORK: &str = "testnet3";

/// Largest span the node serves from a single `/blocks` request.
pub const DEFAULT_MAX_BLOCK_RANGE: u32 = 50;

/// Range pages in flight at once when none is configured.
pub const DEFAULT_MAX_CONCURRENT_PAGES: usize = 8;

// ==============================================================================
// Retry Policy
// ==============================================================================

/// Bounded exponential backoff applied by the HTTP transport to transient
/// failures (connect and timeout errors, `429`, and `5xx` replies that do
/// not report a missing item).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay before attempt `attempt + 1`, where `attempt` is 1-based.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

// ==============================================================================
// Client Config
// ==============================================================================

/// Settings for [`AleoNetworkClient`](crate::AleoNetworkClient) and its
/// HTTP transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, for example `https://vm.aleo.org/api`.
    pub base_url: String,
    /// Path segment every route is nested under.
    pub network: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    /// Outbound request budget. Each attempt counts, retries included.
    pub requests_per_second: Option<u32>,
    pub basic_auth: Option<(String, String)>,
    /// Page size used to split block ranges.
    pub max_block_range: u32,
    /// Cap on range pages requested concurrently.
    pub max_concurrent_pages: usize,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            network: DEFAULT_NETWORK.to_owned(),
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            requests_per_second: None,
            basic_auth: None,
            max_block_range: DEFAULT_MAX_BLOCK_RANGE,
            max_concurrent_pages: DEFAULT_MAX_CONCURRENT_PAGES,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    pub fn with_timeouts(mut self, connect_timeout: Duration, timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self.timeout = timeout;
        self
    }

    pub fn with_requests_per_second(mut self, limit: u32) -> Self {
        self.requests_per_second = Some(limit);
        self
    }

    pub fn with_basic_auth(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.basic_auth = Some((user.into(), pass.into()));
        self
    }

    pub fn with_max_block_range(mut self, max_block_range: u32) -> Self {
        self.max_block_range = max_block_range;
        self
    }

    pub fn with_max_concurrent_pages(mut self, max_concurrent_pages: usize) -> Self {
        self.max_concurrent_pages = max_concurrent_pages;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Reject values the client cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_block_range == 0 {
            return Err(ConfigError::Zero("max_block_range"));
        }
        if self.max_concurrent_pages == 0 {
            return Err(ConfigError::Zero("max_concurrent_pages"));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Zero("retry.max_attempts"));
        }
        if self.requests_per_second == Some(0) {
            return Err(ConfigError::Zero("requests_per_second"));
        }
        Ok(())
    }
}
