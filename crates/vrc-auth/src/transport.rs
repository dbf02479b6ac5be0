use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::{RetryPolicy, VrcAuthConfig};
use crate::errors::{Result, VrcAuthError};

/// HTTP response with the body already read
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// First 200 characters of the body, for error details
    pub fn body_snippet(&self) -> String {
        self.body.chars().take(200).collect()
    }

    /// All `Set-Cookie` values that are valid header strings
    pub fn set_cookie_values(&self) -> Vec<&str> {
        self.headers
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect()
    }
}

/// Thin request executor shared by the authenticator and the API client.
///
/// Applies the configured user-agent and timeouts, retries transient
/// failures up to the configured bound, and fails over across candidate
/// URLs in order. HTTP error statuses are never retried here; they are
/// returned for the caller to interpret.
#[derive(Debug, Clone)]
pub struct Transport {
    http: Client,
    retry: RetryPolicy,
}

impl Transport {
    pub fn new(config: &VrcAuthConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(config.http_timeouts.connect)
            .timeout(config.http_timeouts.request)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            http,
            retry: config.retry.clone(),
        })
    }

    /// GET across candidate URLs in order, returning the first response
    /// obtained without a transport-level error. If every candidate fails
    /// the last error is surfaced.
    pub async fn get(&self, candidates: &[Url], headers: HeaderMap) -> Result<RawResponse> {
        let mut last_error = None;

        for (index, url) in candidates.iter().enumerate() {
            match self
                .execute(Method::GET, url.clone(), headers.clone(), None::<&()>)
                .await
            {
                Ok(response) => return Ok(response),
                Err(error) => {
                    if index + 1 < candidates.len() {
                        warn!("request to {url} failed, trying next candidate: {error}");
                    }
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            VrcAuthError::InvalidConfig("no candidate URLs to request".to_string())
        }))
    }

    pub async fn post_json<B>(&self, url: Url, headers: HeaderMap, body: &B) -> Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        self.execute(Method::POST, url, headers, Some(body)).await
    }

    async fn execute<B>(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<&B>,
    ) -> Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        let mut attempt = 1;

        loop {
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .headers(headers.clone());
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    let headers = response.headers().clone();
                    let body = response.text().await.unwrap_or_default();
                    debug!(%status, %url, "request completed");
                    return Ok(RawResponse {
                        status,
                        headers,
                        body,
                    });
                }
                Err(error) if attempt < self.retry.max_attempts && is_transient(&error) => {
                    warn!(attempt, %url, "transient transport error, retrying: {error}");
                    tokio::time::sleep(self.retry.base_delay * attempt).await;
                    attempt += 1;
                }
                Err(error) => return Err(error.into()),
            }
        }
    }
}

fn is_transient(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}
