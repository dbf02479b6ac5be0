use thiserror::Error;

/// Credential lifecycle error types
#[derive(Error, Debug)]
pub enum VrcAuthError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error {status}: {body_snippet}")]
    Http {
        status: reqwest::StatusCode,
        body_snippet: String,
    },

    #[error("cannot reach identity endpoint: {0}")]
    IdentityUnreachable(#[source] Box<VrcAuthError>),

    #[error("invalid account credentials")]
    CredentialsRejected,

    #[error("missing auth cookie in login response")]
    MissingAuthCookie,

    #[error("second factor not accepted after {attempts} attempts")]
    SecondFactorExhausted { attempts: u32 },

    #[error("second factor solicitation aborted")]
    SecondFactorAborted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, VrcAuthError>;
