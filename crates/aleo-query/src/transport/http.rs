use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header;
use tracing::{debug, trace, warn};

use crate::config::{ClientConfig, RetryPolicy};
use crate::error::{ConfigError, TransportError};

use super::connection::{resolve_auth, resolve_root};
use super::Transport;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Node API transport over HTTP(S).
///
/// Every request is `GET {base_url}/{network}{path}`. Transient failures are
/// retried with bounded exponential backoff; everything else is returned to
/// the caller on the first attempt.
pub struct HttpTransport {
    client: reqwest::Client,
    root: String,
    auth: Option<(String, String)>,
    limiter: Option<DirectRateLimiter>,
    retry: RetryPolicy,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let root = resolve_root(&config.base_url, &config.network)?;
        let auth = resolve_auth(config.basic_auth.as_ref())?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .pool_max_idle_per_host(32)
            .tcp_nodelay(true)
            .build()
            .expect("reqwest client builder uses valid static config");

        let limiter = match config.requests_per_second {
            None => None,
            Some(limit) => {
                let limit =
                    NonZeroU32::new(limit).ok_or(ConfigError::Zero("requests_per_second"))?;
                Some(RateLimiter::direct(Quota::per_second(limit)))
            }
        };

        Ok(Self {
            client,
            root,
            auth,
            limiter,
            retry: config.retry.clone(),
        })
    }

    /// Prefix every request path is appended to.
    pub fn root(&self) -> &str {
        &self.root
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    async fn get_once(&self, url: &str, attempt: u32) -> Result<String, TransportError> {
        self.wait_for_rate_limit().await;
        debug!(http.url = url, http.attempt = attempt, "node request");

        let mut builder = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json");
        if let Some((ref user, ref pass)) = self.auth {
            builder = builder.basic_auth(user, Some(pass));
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(http.url = url, %status, body_len = body.len(), "node response");
        trace!(http.url = url, body = %body, "node response body");

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<String, TransportError> {
        let url = format!("{}{path}", self.root);
        let mut attempt = 1;
        loop {
            match self.get_once(&url, attempt).await {
                Ok(body) => return Ok(body),
                Err(err) if attempt < self.retry.max_attempts && err.is_transient() => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        http.url = %url,
                        http.attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient node failure; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
