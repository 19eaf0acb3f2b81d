use thiserror::Error;

pub type SitepassResult<T> = Result<T, SitepassError>;

#[derive(Debug, Error)]
pub enum SitepassError {
    /// Alphabet too small (or too large) to address with an extracted symbol
    #[error("invalid alphabet: {0}")]
    InvalidAlphabet(String),

    /// The underlying password-hashing primitive rejected its inputs
    #[error("key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
