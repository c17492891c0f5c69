use thiserror::Error;

/// Failures reported by the key generation collaborator.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Failed to generate keys: {0}")]
    KeyGenerationError(String),
    #[error("Unsupported parameter group: {0}")]
    UnsupportedParameters(String),
}

impl From<rand::Error> for CryptoError {
    fn from(err: rand::Error) -> Self {
        CryptoError::KeyGenerationError(err.to_string())
    }
}
