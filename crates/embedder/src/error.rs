use thiserror::Error;

pub type Result<T> = std::result::Result<T, EmbedError>;

#[derive(Error, Debug)]
pub enum EmbedError {
    /// Network-level failure: connect, timeout, or a server-side error.
    #[error("embedding transport error: {0}")]
    Transport(String),

    /// The provider refused the request: auth, quota, or a response that
    /// does not match the contract.
    #[error("embedding request rejected: {0}")]
    Rejected(String),

    #[error("embedder configuration error: {0}")]
    Config(String),
}
