//! HTTP sender with address failover and bounded retry.
//!
//! Connection, authentication, TLS and retry-timeout settings are handed
//! through from the caller unmodified; the sender decides nothing about
//! what goes into the rows it drains.

use crate::buffer::Buffer;
use crate::error::IlpError;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// First retry backoff; doubles on every failed attempt.
const INITIAL_BACKOFF: Duration = Duration::from_millis(100);

/// Backoff ceiling.
const MAX_BACKOFF: Duration = Duration::from_millis(5_000);

/// Default retry budget for a failed write.
pub const DEFAULT_RETRY_TIMEOUT: Duration = Duration::from_millis(360_000);

/// Authentication for the ingestion endpoint.
///
/// Configuring any credentials switches the sender to HTTPS, with
/// certificate validation disabled (ingestion rigs typically run
/// self-signed certificates).
#[derive(Debug, Clone, Default)]
pub enum Auth {
    /// No authentication, plain HTTP.
    #[default]
    None,
    /// Bearer token.
    Token(String),
    /// HTTP basic credentials.
    Basic {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
}

/// Sender configuration.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// `host:port` addresses, tried in order with client-side failover.
    pub addrs: Vec<String>,
    /// Endpoint authentication.
    pub auth: Auth,
    /// Total time to keep retrying a failed write.
    pub retry_timeout: Duration,
}

impl SenderConfig {
    /// Parse a comma-separated address list.
    pub fn from_addr_list(addrs: &str) -> Result<Self, IlpError> {
        let addrs: Vec<String> = addrs
            .split(',')
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if addrs.is_empty() {
            return Err(IlpError::Config("no ingestion addresses given".to_string()));
        }
        Ok(Self {
            addrs,
            auth: Auth::None,
            retry_timeout: DEFAULT_RETRY_TIMEOUT,
        })
    }

    /// Set the endpoint authentication.
    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    /// Set the retry budget.
    pub fn with_retry_timeout(mut self, retry_timeout: Duration) -> Self {
        self.retry_timeout = retry_timeout;
        self
    }

    /// True when credentials are configured; credentials imply HTTPS.
    pub fn uses_tls(&self) -> bool {
        !matches!(self.auth, Auth::None)
    }

    /// Human-readable connection description with secrets redacted.
    pub fn describe(&self) -> String {
        let scheme = if self.uses_tls() { "https" } else { "http" };
        let mut out = format!("{scheme}::");
        for addr in &self.addrs {
            out.push_str("addr=");
            out.push_str(addr);
            out.push(';');
        }
        match &self.auth {
            Auth::None => {}
            Auth::Token(_) => out.push_str("token=***;"),
            Auth::Basic { username, .. } => {
                out.push_str("username=");
                out.push_str(username);
                out.push_str(";password=***;");
            }
        }
        if self.uses_tls() {
            out.push_str("tls_verify=unsafe_off;");
        }
        out.push_str(&format!("retry_timeout={};", self.retry_timeout.as_millis()));
        out
    }
}

/// An exclusive ingestion session.
///
/// Each sender owns its own HTTP client; sessions are never shared between
/// workers. Construction performs no IO, the first [`Sender::flush`] does.
pub struct Sender {
    client: reqwest::Client,
    endpoints: Vec<String>,
    active: usize,
    retry_timeout: Duration,
    auth: Auth,
}

impl Sender {
    /// Build a sender from configuration.
    pub fn connect(config: &SenderConfig) -> Result<Self, IlpError> {
        if config.addrs.is_empty() {
            return Err(IlpError::Config("no ingestion addresses given".to_string()));
        }

        let scheme = if config.uses_tls() { "https" } else { "http" };
        let mut builder = reqwest::Client::builder();
        if config.uses_tls() {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build()?;

        let endpoints = config
            .addrs
            .iter()
            .map(|addr| format!("{scheme}://{addr}/write"))
            .collect();

        Ok(Self {
            client,
            endpoints,
            active: 0,
            retry_timeout: config.retry_timeout,
            auth: config.auth.clone(),
        })
    }

    /// Drain the buffer to the endpoint.
    ///
    /// Retries with doubling backoff and address failover until the retry
    /// timeout elapses. Server-side rejections (HTTP 4xx) are terminal
    /// immediately. The buffer is cleared on success and left intact on
    /// failure so the caller can inspect what was lost.
    pub async fn flush(&mut self, buffer: &mut Buffer) -> Result<(), IlpError> {
        if buffer.is_empty() {
            return Ok(());
        }

        let started = Instant::now();
        let mut backoff = INITIAL_BACKOFF;

        loop {
            match self.try_write(buffer.as_str()).await {
                Ok(()) => {
                    debug!(
                        "flushed {} rows ({} bytes) to {}",
                        buffer.row_count(),
                        buffer.len(),
                        self.endpoints[self.active]
                    );
                    buffer.clear();
                    return Ok(());
                }
                Err(IlpError::Rejected { status, body }) if status < 500 => {
                    return Err(IlpError::Rejected { status, body });
                }
                Err(e) => {
                    let failed_endpoint = self.endpoints[self.active].clone();
                    self.active = (self.active + 1) % self.endpoints.len();

                    if started.elapsed() >= self.retry_timeout {
                        return Err(IlpError::RetryTimeout {
                            elapsed_ms: started.elapsed().as_millis() as u64,
                            last_error: e.to_string(),
                        });
                    }

                    warn!(
                        "write to {} failed ({}), retrying via {} in {:?}",
                        failed_endpoint, e, self.endpoints[self.active], backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }
    }

    async fn try_write(&self, body: &str) -> Result<(), IlpError> {
        let mut request = self
            .client
            .post(&self.endpoints[self.active])
            .body(body.to_string());

        match &self.auth {
            Auth::None => {}
            Auth::Token(token) => request = request.bearer_auth(token),
            Auth::Basic { username, password } => {
                request = request.basic_auth(username, Some(password));
            }
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(IlpError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addr_list_parsing() {
        let config = SenderConfig::from_addr_list("a:9000, b:9000 ,,c:9000").unwrap();
        assert_eq!(config.addrs, vec!["a:9000", "b:9000", "c:9000"]);
    }

    #[test]
    fn test_empty_addr_list_is_rejected() {
        assert!(matches!(
            SenderConfig::from_addr_list(" , "),
            Err(IlpError::Config(_))
        ));
    }

    #[test]
    fn test_auth_implies_tls() {
        let plain = SenderConfig::from_addr_list("a:9000").unwrap();
        assert!(!plain.uses_tls());

        let token = plain.clone().with_auth(Auth::Token("secret".to_string()));
        assert!(token.uses_tls());

        let basic = plain.with_auth(Auth::Basic {
            username: "u".to_string(),
            password: "p".to_string(),
        });
        assert!(basic.uses_tls());
    }

    #[test]
    fn test_describe_redacts_secrets() {
        let config = SenderConfig::from_addr_list("db:9000")
            .unwrap()
            .with_auth(Auth::Token("super-secret".to_string()));

        let described = config.describe();
        assert!(described.starts_with("https::addr=db:9000;"));
        assert!(described.contains("token=***;"));
        assert!(!described.contains("super-secret"));

        let config = SenderConfig::from_addr_list("db:9000")
            .unwrap()
            .with_auth(Auth::Basic {
                username: "admin".to_string(),
                password: "hunter2".to_string(),
            });

        let described = config.describe();
        assert!(described.contains("username=admin;password=***;"));
        assert!(!described.contains("hunter2"));
    }

    #[test]
    fn test_describe_plain_http() {
        let config = SenderConfig::from_addr_list("db:9000").unwrap();
        let described = config.describe();

        assert!(described.starts_with("http::addr=db:9000;"));
        assert!(!described.contains("tls_verify"));
        assert!(described.contains("retry_timeout=360000;"));
    }

    #[test]
    fn test_connect_builds_one_endpoint_per_addr() {
        let config = SenderConfig::from_addr_list("a:9000,b:9000").unwrap();
        let sender = Sender::connect(&config).unwrap();

        assert_eq!(
            sender.endpoints,
            vec!["http://a:9000/write", "http://b:9000/write"]
        );
    }
}
