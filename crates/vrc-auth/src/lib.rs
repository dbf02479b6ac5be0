//! Credential lifecycle for a session-cookie web API.
//!
//! This crate obtains session cookies from the upstream identity endpoint,
//! persists them in a human-readable credential store, validates them
//! against the "who am I" probe, and completes the interactive TOTP
//! second-factor challenge when the account requires one.
//!
//! # Login flow
//!
//! 1. `GET auth/user` with the account's HTTP Basic token
//! 2. Parse the `Set-Cookie` response into a [`SessionArtifact`]
//! 3. Probe the artifact against `auth/user`
//! 4. If a second factor is pending, solicit codes through a
//!    [`SecondFactorProvider`] (bounded attempts)
//! 5. Persist the artifact through the [`CredentialStore`]
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use vrc_auth::authenticator::Authenticator;
//! use vrc_auth::config::{UpstreamCredentials, VrcAuthConfig};
//! use vrc_auth::file_store::FileCredentialStore;
//! use vrc_auth::second_factor::ChannelCodeProvider;
//! use vrc_auth::transport::Transport;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let credentials = UpstreamCredentials::new(std::env::var("VRC_BASIC_TOKEN")?)?;
//!     let config = VrcAuthConfig::new(credentials, FileCredentialStore::default_path()?);
//!     let store = Arc::new(FileCredentialStore::new(config.cookie_path.clone()));
//!
//!     // Surface second-factor prompts to an operator channel instead of
//!     // blocking a serving thread on stdin.
//!     let (provider, mut requests) = ChannelCodeProvider::new(1);
//!     tokio::spawn(async move {
//!         while let Some(request) = requests.recv().await {
//!             let code = "123456".to_string(); // ask the operator
//!             let _ = request.reply.send(code);
//!         }
//!     });
//!
//!     let transport = Transport::new(&config)?;
//!     let authenticator = Authenticator::new(config, transport, store, Arc::new(provider));
//!     let artifact = authenticator.login().await?;
//!     println!("authenticated: {}", artifact.is_valid());
//!     Ok(())
//! }
//! ```
//!
//! # Credential persistence
//!
//! The [`FileCredentialStore`] keeps the cookie map as plain pretty-printed
//! JSON so an operator can inspect or delete it. A missing, malformed, or
//! auth-less file is treated as absent and triggers a fresh login; it is
//! never a fatal error.

pub mod artifact;
pub mod authenticator;
pub mod config;
pub mod errors;
pub mod file_store;
pub mod models;
pub mod second_factor;
pub mod store;
pub mod transport;

// Re-export main types
pub use artifact::SessionArtifact;
pub use authenticator::{AuthPhase, Authenticator, ValidationOutcome};
pub use config::{UpstreamCredentials, VrcAuthConfig};
pub use errors::{Result, VrcAuthError};
pub use file_store::FileCredentialStore;
pub use models::IdentityProbe;
pub use second_factor::{
    ChannelCodeProvider, CodeRequest, SecondFactorProvider, StaticCodeProvider,
};
pub use store::{CredentialStore, MemoryCredentialStore};
pub use transport::{RawResponse, Transport};
