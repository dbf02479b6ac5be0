use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, COOKIE, HeaderMap, HeaderValue};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::artifact::SessionArtifact;
use crate::config::{VrcAuthConfig, endpoints};
use crate::errors::{Result, VrcAuthError};
use crate::models::{IdentityProbe, TotpVerifyRequest};
use crate::second_factor::SecondFactorProvider;
use crate::store::CredentialStore;
use crate::transport::Transport;

/// Phase of a login run, for logging and introspection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Idle,
    Requesting,
    AwaitingSecondFactor,
    Validating,
    Authenticated,
    Failed,
}

/// Outcome of probing an artifact against the identity endpoint
#[derive(Debug, Clone)]
pub enum ValidationOutcome {
    /// The artifact authenticates; the probe returned the account identity
    Valid(IdentityProbe),
    /// The artifact is real but the login is waiting on a one-time code.
    /// This is deliberately distinct from `Invalid`: the caller needs a
    /// code, not a new login.
    SecondFactorRequired,
    /// The artifact does not authenticate; a fresh login is needed
    Invalid,
}

/// Obtains, validates, and persists session artifacts.
///
/// The only writer of new artifacts: a successful login run persists its
/// artifact through the credential store before returning it.
pub struct Authenticator {
    config: VrcAuthConfig,
    transport: Transport,
    store: Arc<dyn CredentialStore>,
    second_factor: Arc<dyn SecondFactorProvider>,
}

impl Authenticator {
    pub fn new(
        config: VrcAuthConfig,
        transport: Transport,
        store: Arc<dyn CredentialStore>,
        second_factor: Arc<dyn SecondFactorProvider>,
    ) -> Self {
        Self {
            config,
            transport,
            store,
            second_factor,
        }
    }

    /// Run the full login flow and persist the resulting artifact.
    ///
    /// Nothing is persisted unless every phase, including a pending second
    /// factor, completes.
    #[instrument(skip(self))]
    pub async fn login(&self) -> Result<SessionArtifact> {
        debug!(phase = ?AuthPhase::Requesting, "requesting fresh session cookies");

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            header_value(&self.config.credentials.authorization_header())?,
        );

        let urls = self.auth_user_urls()?;
        let response = self
            .transport
            .get(&urls, headers)
            .await
            .map_err(|error| VrcAuthError::IdentityUnreachable(Box::new(error)))?;

        if response.status == StatusCode::UNAUTHORIZED {
            warn!(phase = ?AuthPhase::Failed, "identity endpoint rejected account credentials");
            return Err(VrcAuthError::CredentialsRejected);
        }
        if !response.is_success() {
            return Err(VrcAuthError::Http {
                status: response.status,
                body_snippet: response.body_snippet(),
            });
        }

        let artifact = SessionArtifact::parse_set_cookie(response.set_cookie_values());
        if !artifact.is_valid() {
            warn!(phase = ?AuthPhase::Failed, "login response carried no auth cookie");
            return Err(VrcAuthError::MissingAuthCookie);
        }

        debug!(phase = ?AuthPhase::Validating, "probing fresh session cookies");
        match self.validate(&artifact).await? {
            ValidationOutcome::Valid(identity) => {
                info!(
                    user = identity.display_name.as_deref().unwrap_or("unknown"),
                    "login complete"
                );
            }
            ValidationOutcome::SecondFactorRequired => {
                debug!(phase = ?AuthPhase::AwaitingSecondFactor, "second factor required");
                self.verify_second_factor(&artifact).await?;
            }
            ValidationOutcome::Invalid => {
                warn!(phase = ?AuthPhase::Failed, "fresh session cookies were rejected");
                return Err(VrcAuthError::CredentialsRejected);
            }
        }

        debug!(phase = ?AuthPhase::Authenticated, "persisting session cookies");
        self.store.save(&artifact).await?;
        Ok(artifact)
    }

    /// Probe an artifact against the identity endpoint without mutating
    /// any state.
    #[instrument(skip(self, artifact))]
    pub async fn validate(&self, artifact: &SessionArtifact) -> Result<ValidationOutcome> {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, header_value(&artifact.cookie_header())?);

        let urls = self.auth_user_urls()?;
        let response = self.transport.get(&urls, headers).await?;

        if response.status == StatusCode::UNAUTHORIZED {
            return Ok(ValidationOutcome::Invalid);
        }
        if !response.is_success() {
            warn!(status = %response.status, "identity probe failed");
            return Ok(ValidationOutcome::Invalid);
        }

        let probe: IdentityProbe = response.json()?;
        if probe.second_factor_required() {
            return Ok(ValidationOutcome::SecondFactorRequired);
        }
        if probe.is_identified() {
            debug!("session cookies verified");
            return Ok(ValidationOutcome::Valid(probe));
        }

        warn!("identity probe returned neither an identity nor a challenge");
        Ok(ValidationOutcome::Invalid)
    }

    /// Bounded interactive TOTP loop.
    ///
    /// Wrong codes, empty codes, and failed verify requests all consume an
    /// attempt, so neither a confused operator nor a dead verify endpoint
    /// can spin the loop forever.
    async fn verify_second_factor(&self, artifact: &SessionArtifact) -> Result<()> {
        let max_attempts = self.config.max_second_factor_attempts;

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, header_value(&artifact.cookie_header())?);

        let base = self.config.base_urls.first().ok_or_else(|| {
            VrcAuthError::InvalidConfig("at least one base URL is required".to_string())
        })?;
        let url = base.join(endpoints::TOTP_VERIFY)?;

        for attempt in 1..=max_attempts {
            let Some(code) = self.second_factor.code(attempt).await else {
                return Err(VrcAuthError::SecondFactorAborted);
            };
            let code = code.trim().to_string();
            if code.is_empty() {
                warn!(attempt, "empty second-factor code");
                continue;
            }

            let request = TotpVerifyRequest { code };
            match self
                .transport
                .post_json(url.clone(), headers.clone(), &request)
                .await
            {
                Ok(response) if response.is_success() => {
                    info!(attempt, "second factor accepted");
                    return Ok(());
                }
                Ok(response) if response.status == StatusCode::UNAUTHORIZED => {
                    warn!(attempt, "second-factor code rejected");
                }
                Ok(response) => {
                    warn!(attempt, status = %response.status, "unexpected second-factor response");
                }
                Err(error) => {
                    warn!(attempt, "second-factor verification request failed: {error}");
                }
            }
        }

        Err(VrcAuthError::SecondFactorExhausted {
            attempts: max_attempts,
        })
    }

    fn auth_user_urls(&self) -> Result<Vec<Url>> {
        self.config
            .base_urls
            .iter()
            .map(|base| Ok(base.join(endpoints::AUTH_USER)?))
            .collect()
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| {
        VrcAuthError::InvalidConfig("header value contains invalid characters".to_string())
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::{RetryPolicy, UpstreamCredentials};
    use crate::store::MemoryCredentialStore;

    /// Hands out a fixed sequence of codes, then aborts
    struct SequenceCodeProvider {
        codes: Mutex<VecDeque<String>>,
    }

    impl SequenceCodeProvider {
        fn new<I: IntoIterator<Item = &'static str>>(codes: I) -> Self {
            Self {
                codes: Mutex::new(codes.into_iter().map(String::from).collect()),
            }
        }
    }

    #[async_trait::async_trait]
    impl SecondFactorProvider for SequenceCodeProvider {
        async fn code(&self, _attempt: u32) -> Option<String> {
            self.codes.lock().unwrap().pop_front()
        }
    }

    fn test_config(server_uri: &str) -> VrcAuthConfig {
        let credentials = UpstreamCredentials::new("dGVzdA==").unwrap();
        let mut config = VrcAuthConfig::new(credentials, "cookie.json")
            .with_base_urls(vec![Url::parse(server_uri).unwrap()])
            .unwrap();
        config.retry = RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::from_millis(0),
        };
        config
    }

    fn authenticator(
        config: VrcAuthConfig,
        store: Arc<dyn CredentialStore>,
        second_factor: Arc<dyn SecondFactorProvider>,
    ) -> Authenticator {
        let transport = Transport::new(&config).unwrap();
        Authenticator::new(config, transport, store, second_factor)
    }

    fn provider(code: &str) -> Arc<dyn SecondFactorProvider> {
        Arc::new(crate::second_factor::StaticCodeProvider::new(code))
    }

    async fn mount_login(server: &MockServer, auth: &str) {
        Mock::given(method("GET"))
            .and(path("/auth/user"))
            .and(header_exists("Authorization"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Set-Cookie", format!("auth={auth}; Path=/").as_str()),
            )
            .mount(server)
            .await;
    }

    async fn mount_probe(server: &MockServer, auth: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/auth/user"))
            .and(header("Cookie", format!("auth={auth}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn login_parses_auth_cookie_and_persists() {
        let server = MockServer::start().await;
        mount_login(&server, "XYZ").await;
        mount_probe(
            &server,
            "XYZ",
            serde_json::json!({"id": "usr_1", "displayName": "Tester"}),
        )
        .await;

        let store = Arc::new(MemoryCredentialStore::new());
        let auth = authenticator(test_config(&server.uri()), store.clone(), provider("000000"));

        let artifact = auth.login().await.unwrap();
        assert_eq!(artifact.auth(), Some("XYZ"));
        assert_eq!(store.load().await, Some(artifact));
    }

    #[tokio::test]
    async fn rejected_account_credentials_are_fatal_and_persist_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/user"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::new());
        let auth = authenticator(test_config(&server.uri()), store.clone(), provider("000000"));

        let result = auth.login().await;
        assert!(matches!(result, Err(VrcAuthError::CredentialsRejected)));
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn login_without_auth_cookie_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/user"))
            .respond_with(ResponseTemplate::new(200).insert_header("Set-Cookie", "other=1; Path=/"))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::new());
        let auth = authenticator(test_config(&server.uri()), store.clone(), provider("000000"));

        let result = auth.login().await;
        assert!(matches!(result, Err(VrcAuthError::MissingAuthCookie)));
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn unreachable_identity_endpoint_is_typed() {
        let config = test_config("http://127.0.0.1:9/");
        let store = Arc::new(MemoryCredentialStore::new());
        let auth = authenticator(config, store, provider("000000"));

        let result = auth.login().await;
        assert!(matches!(result, Err(VrcAuthError::IdentityUnreachable(_))));
    }

    #[tokio::test]
    async fn validate_reports_second_factor_distinctly() {
        let server = MockServer::start().await;
        mount_probe(
            &server,
            "XYZ",
            serde_json::json!({"requiresTwoFactorAuth": true}),
        )
        .await;

        let store = Arc::new(MemoryCredentialStore::new());
        let auth = authenticator(test_config(&server.uri()), store, provider("000000"));

        let artifact = SessionArtifact::parse_set_cookie(["auth=XYZ; Path=/"]);
        let outcome = auth.validate(&artifact).await.unwrap();
        assert!(matches!(outcome, ValidationOutcome::SecondFactorRequired));
    }

    #[tokio::test]
    async fn validate_reports_method_list_as_second_factor() {
        let server = MockServer::start().await;
        mount_probe(
            &server,
            "XYZ",
            serde_json::json!({"requiresTwoFactorAuth": ["totp"]}),
        )
        .await;

        let store = Arc::new(MemoryCredentialStore::new());
        let auth = authenticator(test_config(&server.uri()), store, provider("000000"));

        let artifact = SessionArtifact::parse_set_cookie(["auth=XYZ; Path=/"]);
        let outcome = auth.validate(&artifact).await.unwrap();
        assert!(matches!(outcome, ValidationOutcome::SecondFactorRequired));
    }

    #[tokio::test]
    async fn validate_reports_unauthorized_as_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/user"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::new());
        let auth = authenticator(test_config(&server.uri()), store, provider("000000"));

        let artifact = SessionArtifact::parse_set_cookie(["auth=XYZ; Path=/"]);
        let outcome = auth.validate(&artifact).await.unwrap();
        assert!(matches!(outcome, ValidationOutcome::Invalid));
    }

    #[tokio::test]
    async fn second_factor_wrong_code_then_correct_succeeds() {
        let server = MockServer::start().await;
        mount_login(&server, "XYZ").await;
        mount_probe(
            &server,
            "XYZ",
            serde_json::json!({"requiresTwoFactorAuth": true}),
        )
        .await;

        // First verification attempt is rejected, the second accepted.
        Mock::given(method("POST"))
            .and(path("/auth/twofactorauth/totp/verify"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/twofactorauth/totp/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "verified": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::new());
        let second_factor = Arc::new(SequenceCodeProvider::new(["111111", "222222"]));
        let auth = authenticator(test_config(&server.uri()), store.clone(), second_factor);

        let artifact = auth.login().await.unwrap();
        assert_eq!(artifact.auth(), Some("XYZ"));
        assert!(store.load().await.is_some());
    }

    #[tokio::test]
    async fn second_factor_exhaustion_is_typed_and_persists_nothing() {
        let server = MockServer::start().await;
        mount_login(&server, "XYZ").await;
        mount_probe(
            &server,
            "XYZ",
            serde_json::json!({"requiresTwoFactorAuth": true}),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/auth/twofactorauth/totp/verify"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::new());
        let mut config = test_config(&server.uri());
        config.max_second_factor_attempts = 2;
        let auth = authenticator(config, store.clone(), provider("123456"));

        let result = auth.login().await;
        assert!(matches!(
            result,
            Err(VrcAuthError::SecondFactorExhausted { attempts: 2 })
        ));
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn second_factor_abort_is_typed() {
        let server = MockServer::start().await;
        mount_login(&server, "XYZ").await;
        mount_probe(
            &server,
            "XYZ",
            serde_json::json!({"requiresTwoFactorAuth": true}),
        )
        .await;

        let store = Arc::new(MemoryCredentialStore::new());
        let second_factor = Arc::new(SequenceCodeProvider::new([]));
        let auth = authenticator(test_config(&server.uri()), store.clone(), second_factor);

        let result = auth.login().await;
        assert!(matches!(result, Err(VrcAuthError::SecondFactorAborted)));
        assert!(store.load().await.is_none());
    }
}
