use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use url::Url;

use vrc_auth::artifact::SessionArtifact;
use vrc_auth::authenticator::Authenticator;
use vrc_auth::config::VrcAuthConfig;
use vrc_auth::errors::VrcAuthError;
use vrc_auth::second_factor::SecondFactorProvider;
use vrc_auth::store::CredentialStore;
use vrc_auth::transport::{RawResponse, Transport};

use crate::error::{ApiError, ApiResult};
use crate::location::{FriendLocation, FriendPresence, ResolvedLocation};
use crate::models::{Avatar, FileInfo, Friend, Group, User, UserGroup, World};

/// Typed read access to the upstream resource endpoints.
///
/// Every accessor lazily logs in on first use, attaches the current
/// session cookies, and transparently re-authenticates exactly once when a
/// call comes back unauthorized. Credential refresh is serialized so
/// concurrent 401s produce a single login.
pub struct VrcApiClient {
    config: VrcAuthConfig,
    transport: Transport,
    store: Arc<dyn CredentialStore>,
    authenticator: Authenticator,
    /// Single-flight guard for credential refresh
    refresh_lock: Mutex<()>,
}

impl VrcApiClient {
    pub fn new(
        config: VrcAuthConfig,
        store: Arc<dyn CredentialStore>,
        second_factor: Arc<dyn SecondFactorProvider>,
    ) -> vrc_auth::errors::Result<Self> {
        let transport = Transport::new(&config)?;
        let authenticator = Authenticator::new(
            config.clone(),
            transport.clone(),
            Arc::clone(&store),
            second_factor,
        );

        Ok(Self {
            config,
            transport,
            store,
            authenticator,
            refresh_lock: Mutex::new(()),
        })
    }

    pub async fn get_user(&self, user_id: &str) -> ApiResult<User> {
        self.get_json(&format!("users/{user_id}")).await
    }

    pub async fn get_group(&self, group_id: &str) -> ApiResult<Group> {
        self.get_json(&format!("groups/{group_id}")).await
    }

    pub async fn get_world(&self, world_id: &str) -> ApiResult<World> {
        self.get_json(&format!("worlds/{world_id}")).await
    }

    pub async fn get_avatar(&self, avatar_id: &str) -> ApiResult<Avatar> {
        self.get_json(&format!("avatars/{avatar_id}")).await
    }

    pub async fn get_file_info(&self, file_id: &str) -> ApiResult<FileInfo> {
        self.get_json(&format!("file/{file_id}")).await
    }

    pub async fn get_user_groups(&self, user_id: &str) -> ApiResult<Vec<UserGroup>> {
        self.get_json(&format!("users/{user_id}/groups")).await
    }

    /// The group a user currently represents, if any.
    ///
    /// The upstream answers this endpoint with `null` or an empty object
    /// when nothing is represented; both map to `None`.
    pub async fn get_represented_group(&self, user_id: &str) -> ApiResult<Option<UserGroup>> {
        let group: Option<UserGroup> = self
            .get_json(&format!("users/{user_id}/groups/represented"))
            .await?;
        Ok(group.filter(|group| !group.is_empty()))
    }

    /// Raw friends list. `offline` selects the offline page of the list;
    /// `n` bounds the page size.
    pub async fn get_friends(&self, offline: bool, n: u32) -> ApiResult<Vec<Friend>> {
        self.get_json(&format!("auth/user/friends?offset=0&n={n}&offline={offline}"))
            .await
    }

    /// Friends list with each friend's instance resolved to a
    /// human-readable place description via a secondary world lookup.
    ///
    /// A failed world lookup degrades that one friend to the raw
    /// descriptor instead of failing the whole list.
    #[instrument(skip(self))]
    pub async fn friend_presences(&self, offline: bool, n: u32) -> ApiResult<Vec<FriendPresence>> {
        let friends = self.get_friends(offline, n).await?;

        let mut presences = Vec::with_capacity(friends.len());
        for friend in friends {
            let location = self.resolve_location(&friend.location).await;
            presences.push(FriendPresence { friend, location });
        }
        Ok(presences)
    }

    async fn resolve_location(&self, raw: &str) -> ResolvedLocation {
        match FriendLocation::parse(raw) {
            Some(FriendLocation::Offline) => ResolvedLocation::Offline,
            Some(FriendLocation::Private) => ResolvedLocation::Private,
            Some(FriendLocation::Traveling) => ResolvedLocation::Traveling,
            Some(FriendLocation::Instance(instance)) => {
                match self.get_world(&instance.world_id).await {
                    Ok(world) => ResolvedLocation::Instance {
                        world_name: world.name,
                        instance_id: instance.instance_id,
                        access: instance.access,
                    },
                    Err(error) => {
                        warn!(
                            world = instance.world_id,
                            "failed to resolve world for friend location: {error}"
                        );
                        ResolvedLocation::Raw(raw.to_string())
                    }
                }
            }
            None => ResolvedLocation::Raw(raw.to_string()),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.get_raw(path).await?;
        response.json().map_err(|error| ApiError::Transport {
            status: Some(response.status),
            detail: format!("invalid response body: {error}"),
        })
    }

    #[instrument(skip(self))]
    async fn get_raw(&self, path: &str) -> ApiResult<RawResponse> {
        let artifact = self.current_artifact().await?;
        let response = self.issue(path, &artifact).await?;

        // One-shot recovery, scoped to this call: the guard is this single
        // code path, never a field shared across calls.
        if response.status == StatusCode::UNAUTHORIZED {
            info!(path, "authentication expired, refreshing session");
            let fresh = self.refresh_artifact(&artifact).await?;
            let retried = self.issue(path, &fresh).await?;
            if retried.status == StatusCode::UNAUTHORIZED {
                warn!(path, "still unauthorized after refreshing session");
                return Err(ApiError::Transport {
                    status: Some(StatusCode::UNAUTHORIZED),
                    detail: "persistent authentication failure".to_string(),
                });
            }
            return classify(path, retried);
        }

        classify(path, response)
    }

    async fn issue(&self, path: &str, artifact: &SessionArtifact) -> ApiResult<RawResponse> {
        let candidates = self.candidates(path)?;

        let mut headers = HeaderMap::new();
        let cookie = HeaderValue::from_str(&artifact.cookie_header()).map_err(|_| {
            ApiError::Transport {
                status: None,
                detail: "session cookies contain invalid header characters".to_string(),
            }
        })?;
        headers.insert(COOKIE, cookie);

        self.transport
            .get(&candidates, headers)
            .await
            .map_err(transport_error)
    }

    fn candidates(&self, path: &str) -> ApiResult<Vec<Url>> {
        self.config
            .base_urls
            .iter()
            .map(|base| {
                base.join(path).map_err(|error| ApiError::Transport {
                    status: None,
                    detail: format!("invalid request path {path}: {error}"),
                })
            })
            .collect()
    }

    /// Load the current artifact, logging in on first use
    async fn current_artifact(&self) -> ApiResult<SessionArtifact> {
        if let Some(artifact) = self.store.load().await {
            return Ok(artifact);
        }

        let _guard = self.refresh_lock.lock().await;
        // another call may have logged in while we waited on the guard
        if let Some(artifact) = self.store.load().await {
            return Ok(artifact);
        }

        info!("no usable session cookies, performing initial login");
        self.authenticator.login().await.map_err(auth_error)
    }

    /// Discard a rejected artifact and obtain a replacement, logging in at
    /// most once across concurrent callers.
    async fn refresh_artifact(&self, rejected: &SessionArtifact) -> ApiResult<SessionArtifact> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.store.load().await {
            if current != *rejected {
                debug!("session already refreshed by a concurrent call");
                return Ok(current);
            }
            self.store.mark_stale().await;
        }

        self.authenticator.login().await.map_err(auth_error)
    }
}

fn classify(path: &str, response: RawResponse) -> ApiResult<RawResponse> {
    if response.status == StatusCode::NOT_FOUND {
        debug!(path, "resource not found");
        return Err(ApiError::NotFound {
            path: path.to_string(),
        });
    }
    if !response.is_success() {
        return Err(ApiError::Transport {
            status: Some(response.status),
            detail: response.body_snippet(),
        });
    }
    Ok(response)
}

fn transport_error(error: VrcAuthError) -> ApiError {
    match error {
        VrcAuthError::Http {
            status,
            body_snippet,
        } => ApiError::Transport {
            status: Some(status),
            detail: body_snippet,
        },
        other => ApiError::Transport {
            status: None,
            detail: other.to_string(),
        },
    }
}

fn auth_error(error: VrcAuthError) -> ApiError {
    ApiError::Transport {
        status: None,
        detail: format!("authentication failed: {error}"),
    }
}
