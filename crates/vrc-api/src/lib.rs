//! Typed, resilient read access to the VRChat web API.
//!
//! Built on [`vrc_auth`] for the credential lifecycle: accessors log in
//! lazily on first use, attach the persisted session cookies to every
//! request, and transparently re-authenticate exactly once when a call
//! comes back unauthorized. Missing resources surface as
//! [`ApiError::NotFound`]; everything else that goes wrong on the wire is
//! an [`ApiError::Transport`] with the status and a body snippet.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use vrc_api::VrcApiClient;
//! use vrc_auth::config::{UpstreamCredentials, VrcAuthConfig};
//! use vrc_auth::file_store::FileCredentialStore;
//! use vrc_auth::second_factor::StaticCodeProvider;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let credentials = UpstreamCredentials::new(std::env::var("VRC_BASIC_TOKEN")?)?;
//! let cookie_path = FileCredentialStore::default_path()?;
//! let config = VrcAuthConfig::new(credentials, &cookie_path);
//!
//! let client = VrcApiClient::new(
//!     config,
//!     Arc::new(FileCredentialStore::new(cookie_path)),
//!     Arc::new(StaticCodeProvider::new("123456")),
//! )?;
//!
//! let world = client.get_world("wrld_00000000-0000-0000-0000-000000000000").await?;
//! println!("{} by {}", world.name, world.author_name);
//!
//! for presence in client.friend_presences(false, 50).await? {
//!     println!("{}: {}", presence.friend.display_name, presence.location);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod location;
pub mod models;

pub use client::VrcApiClient;
pub use error::{ApiError, ApiResult};
pub use location::{
    FriendLocation, FriendPresence, InstanceAccess, InstanceRef, ResolvedLocation,
};
pub use models::{
    Avatar, FileDescriptor, FileInfo, FileVersion, Friend, Group, User, UserGroup, World,
};
