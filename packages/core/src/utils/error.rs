// Типы ошибок

use crate::error::CryptoError;
use thiserror::Error;

/// Errors raised by the client control layer.
///
/// Modeled protocol outcomes (a remote error header, no channel) are not
/// errors; they come back as [`crate::msg::Response`] variants.
#[derive(Error, Debug)]
pub enum MslError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported key exchange type: {0}")]
    UnsupportedKeyExchangeType(String),

    #[error("Malformed data: {0}")]
    MalformedData(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Request interrupted: {0}")]
    Interrupted(String),

    #[error("Cryptography error: {0}")]
    Crypto(#[from] CryptoError),
}

impl MslError {
    /// Whether the caller may reasonably retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MslError::TransportFailure(_) | MslError::Timeout(_) | MslError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MslError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(MslError::Timeout(10).is_retryable());
        assert!(MslError::TransportFailure("reset".to_string()).is_retryable());
        assert!(!MslError::IllegalState("no handle".to_string()).is_retryable());
        assert!(!MslError::MalformedData("root".to_string()).is_retryable());
    }

    #[test]
    fn test_crypto_error_conversion() {
        let err: MslError = CryptoError::KeyGenerationError("rng".to_string()).into();
        assert!(matches!(err, MslError::Crypto(_)));
        assert_eq!(err.to_string(), "Cryptography error: Failed to generate keys: rng");
    }
}
