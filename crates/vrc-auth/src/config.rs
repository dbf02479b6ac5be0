use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::errors::{Result, VrcAuthError};

/// Identity endpoint paths, relative to a base URL
pub mod endpoints {
    pub const AUTH_USER: &str = "auth/user";
    pub const TOTP_VERIFY: &str = "auth/twofactorauth/totp/verify";
}

/// Default upstream API base
pub const DEFAULT_BASE_URL: &str = "https://api.vrchat.cloud/api/1/";

/// Default identifying header sent on every request
pub const DEFAULT_USER_AGENT: &str = "vrc-api/0.1";

/// Static HTTP Basic token identifying the account.
///
/// Supplied once at startup and never mutated. The token is redacted from
/// `Debug` output so it cannot leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamCredentials(String);

impl UpstreamCredentials {
    pub fn new(basic_token: impl Into<String>) -> Result<Self> {
        let token = basic_token.into();
        if token.trim().is_empty() {
            return Err(VrcAuthError::InvalidConfig(
                "upstream credentials must not be empty".to_string(),
            ));
        }
        Ok(Self(token))
    }

    /// Value for the `Authorization` header of the login request
    pub fn authorization_header(&self) -> String {
        format!("Basic {}", self.0)
    }
}

impl fmt::Debug for UpstreamCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UpstreamCredentials(***)")
    }
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(15),
            request: Duration::from_secs(30),
        }
    }
}

/// Retry policy for transient transport failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per URL, including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Upper bound on interactive second-factor rounds before the login fails
pub const DEFAULT_SECOND_FACTOR_ATTEMPTS: u32 = 3;

/// Configuration for the credential lifecycle components
#[derive(Debug, Clone)]
pub struct VrcAuthConfig {
    /// Account material for the login request
    pub credentials: UpstreamCredentials,

    /// Candidate API bases, tried in order; the first is authoritative
    pub base_urls: Vec<Url>,

    /// Location of the persisted cookie file
    pub cookie_path: PathBuf,

    /// Identifying header; callers may override per request
    pub user_agent: String,

    /// HTTP client timeouts
    pub http_timeouts: HttpTimeouts,

    /// Retry policy for transient failures
    pub retry: RetryPolicy,

    /// Bound on the interactive second-factor loop
    pub max_second_factor_attempts: u32,
}

impl VrcAuthConfig {
    /// Create a config against the default upstream API.
    ///
    /// `credentials` are already validated by [`UpstreamCredentials::new`].
    pub fn new(credentials: UpstreamCredentials, cookie_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials,
            base_urls: vec![Url::parse(DEFAULT_BASE_URL).expect("valid default base URL")],
            cookie_path: cookie_path.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeouts: HttpTimeouts::default(),
            retry: RetryPolicy::default(),
            max_second_factor_attempts: DEFAULT_SECOND_FACTOR_ATTEMPTS,
        }
    }

    /// Replace the candidate base URLs. Order is significant and at least
    /// one URL is required. Bases are normalized to end with `/` so path
    /// joins keep the full prefix.
    pub fn with_base_urls(mut self, base_urls: Vec<Url>) -> Result<Self> {
        if base_urls.is_empty() {
            return Err(VrcAuthError::InvalidConfig(
                "at least one base URL is required".to_string(),
            ));
        }
        let mut normalized = Vec::with_capacity(base_urls.len());
        for url in base_urls {
            if url.path().ends_with('/') {
                normalized.push(url);
            } else {
                let mut with_slash = url;
                with_slash.set_path(&format!("{}/", with_slash.path()));
                normalized.push(with_slash);
            }
        }
        self.base_urls = normalized;
        Ok(self)
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
