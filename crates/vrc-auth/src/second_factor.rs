use tokio::sync::{mpsc, oneshot};
use tracing::warn;

/// Out-of-band source of one-time second-factor codes.
///
/// Implementations decide how the operator is reached; the authenticator
/// itself never blocks on terminal input.
#[async_trait::async_trait]
pub trait SecondFactorProvider: Send + Sync {
    /// Solicit a code for the given 1-based attempt.
    ///
    /// Returning `None` aborts the login.
    async fn code(&self, attempt: u32) -> Option<String>;
}

/// Fixed code provider, for configurations with a pre-shared code and for
/// tests
#[derive(Debug, Clone)]
pub struct StaticCodeProvider {
    code: String,
}

impl StaticCodeProvider {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

#[async_trait::async_trait]
impl SecondFactorProvider for StaticCodeProvider {
    async fn code(&self, _attempt: u32) -> Option<String> {
        Some(self.code.clone())
    }
}

/// A solicited code request carrying its reply channel
#[derive(Debug)]
pub struct CodeRequest {
    pub attempt: u32,
    pub reply: oneshot::Sender<String>,
}

/// Forwards solicitations over a channel so a host can surface an
/// "operator action needed" signal and answer it from anywhere.
#[derive(Debug, Clone)]
pub struct ChannelCodeProvider {
    requests: mpsc::Sender<CodeRequest>,
}

impl ChannelCodeProvider {
    /// Returns the provider and the receiving end the host listens on
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<CodeRequest>) {
        let (requests, receiver) = mpsc::channel(buffer);
        (Self { requests }, receiver)
    }
}

#[async_trait::async_trait]
impl SecondFactorProvider for ChannelCodeProvider {
    async fn code(&self, attempt: u32) -> Option<String> {
        let (reply, receive_reply) = oneshot::channel();

        if self
            .requests
            .send(CodeRequest { attempt, reply })
            .await
            .is_err()
        {
            warn!("second-factor channel closed, aborting solicitation");
            return None;
        }

        receive_reply.await.ok()
    }
}
