use thiserror::Error;

/// Caller-visible failure for every resource accessor.
///
/// Authentication problems never appear here directly: the client retries
/// once behind the scenes and folds a failed recovery into [`Transport`]
/// detail. Callers also never see raw session artifacts.
///
/// [`Transport`]: ApiError::Transport
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("resource not found: {path}")]
    NotFound { path: String },

    #[error("transport failure: {detail}")]
    Transport {
        status: Option<reqwest::StatusCode>,
        detail: String,
    },
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
