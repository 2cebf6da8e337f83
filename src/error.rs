use thiserror::Error;

/// Failures talking to the remote gallery endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("credential is not ready")]
    CredentialPending,
    #[error("request was rejected as unauthorized")]
    Unauthorized,
    #[error("unexpected response status {0}")]
    Status(u16),
    #[error("http request failed: {0}")]
    Http(String),
    #[error("decode response body failed: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Http(err.to_string())
        }
    }
}

/// Failures around the on-disk identity store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("read identity store failed: {0}")]
    Read(String),
    #[error("parse identity store failed: {0}")]
    Parse(String),
    #[error("mkdir identity store dir failed: {0}")]
    CreateDir(String),
    #[error("serialize identity store failed: {0}")]
    Serialize(String),
    #[error("write identity store failed: {0}")]
    Write(String),
}

/// Failures while assembling a session.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("gallery config invalid: {0}")]
    InvalidConfig(String),
    #[error("build http client failed: {0}")]
    Client(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
