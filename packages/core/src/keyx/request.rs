// Key request data
// Описывают запрошенный механизм обмена ключами для одного сообщения

use crate::keyx::KeyExchangeScheme;
use crate::utils::error::{MslError, Result};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Asymmetric key pair produced by a [`crate::keyx::KeyPairGenerator`].
///
/// Private material is wiped on drop and never printed.
#[derive(Clone)]
pub struct KeyPair {
    public_key: Vec<u8>,
    private_key: Zeroizing<Vec<u8>>,
}

impl KeyPair {
    pub fn new(public_key: Vec<u8>, private_key: Vec<u8>) -> Self {
        Self {
            public_key,
            private_key: Zeroizing::new(private_key),
        }
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    /// First 8 bytes of SHA-256 over the public key, hex encoded.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.public_key);
        hex::encode(&digest[..8])
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("fingerprint", &self.fingerprint())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Symmetric wrapped exchange key identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymmetricKeyId {
    /// Pre-shared wrapping key
    Psk,
    /// Session wrapping key from the current master token
    Session,
}

/// Asymmetric wrapped exchange mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsymmetricMechanism {
    Rsa,
    Ecc,
    JweRsa,
    JwejsRsa,
    JwkRsa,
    JwkRsaes,
}

impl AsymmetricMechanism {
    pub fn as_str(&self) -> &'static str {
        match self {
            AsymmetricMechanism::Rsa => "RSA",
            AsymmetricMechanism::Ecc => "ECC",
            AsymmetricMechanism::JweRsa => "JWE_RSA",
            AsymmetricMechanism::JwejsRsa => "JWEJS_RSA",
            AsymmetricMechanism::JwkRsa => "JWK_RSA",
            AsymmetricMechanism::JwkRsaes => "JWK_RSAES",
        }
    }
}

impl FromStr for AsymmetricMechanism {
    type Err = MslError;

    // Exact enumerant names only.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RSA" => Ok(AsymmetricMechanism::Rsa),
            "ECC" => Ok(AsymmetricMechanism::Ecc),
            "JWE_RSA" => Ok(AsymmetricMechanism::JweRsa),
            "JWEJS_RSA" => Ok(AsymmetricMechanism::JwejsRsa),
            "JWK_RSA" => Ok(AsymmetricMechanism::JwkRsa),
            "JWK_RSAES" => Ok(AsymmetricMechanism::JwkRsaes),
            other => Err(MslError::InvalidArgument(format!(
                "No asymmetric wrapped exchange mechanism named {}",
                other
            ))),
        }
    }
}

impl fmt::Display for AsymmetricMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON Web Encryption / JSON Web Key ladder mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LadderMechanism {
    /// Wrap with the pre-shared key (first rung)
    Psk,
    /// Wrap with previously issued wrap data
    Wrap,
}

/// A single key exchange request attached to an outbound message.
#[derive(Debug, Clone)]
pub enum KeyRequestData {
    /// Ephemeral key pair in a named parameter group.
    DiffieHellman {
        parameters_id: String,
        key_pair: KeyPair,
    },
    SymmetricWrapped {
        key_id: SymmetricKeyId,
    },
    /// The key pair is shared with the selector cache.
    AsymmetricWrapped {
        key_pair_id: String,
        mechanism: AsymmetricMechanism,
        key_pair: Arc<KeyPair>,
    },
    JsonWebEncryptionLadder {
        mechanism: LadderMechanism,
        wrap_data: Option<Vec<u8>>,
    },
    JsonWebKeyLadder {
        mechanism: LadderMechanism,
        wrap_data: Option<Vec<u8>>,
    },
}

impl KeyRequestData {
    pub fn scheme(&self) -> KeyExchangeScheme {
        match self {
            KeyRequestData::DiffieHellman { .. } => KeyExchangeScheme::DiffieHellman,
            KeyRequestData::SymmetricWrapped { .. } => KeyExchangeScheme::SymmetricWrapped,
            KeyRequestData::AsymmetricWrapped { .. } => KeyExchangeScheme::AsymmetricWrapped,
            KeyRequestData::JsonWebEncryptionLadder { .. } => KeyExchangeScheme::JweLadder,
            KeyRequestData::JsonWebKeyLadder { .. } => KeyExchangeScheme::JwkLadder,
        }
    }

    /// Public half of the key pair carried by this request, if any.
    pub fn public_key(&self) -> Option<&[u8]> {
        match self {
            KeyRequestData::DiffieHellman { key_pair, .. } => Some(key_pair.public_key()),
            KeyRequestData::AsymmetricWrapped { key_pair, .. } => Some(key_pair.public_key()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mechanism_parsing() {
        assert_eq!("RSA".parse::<AsymmetricMechanism>().unwrap(), AsymmetricMechanism::Rsa);
        assert_eq!(
            "JWK_RSAES".parse::<AsymmetricMechanism>().unwrap(),
            AsymmetricMechanism::JwkRsaes
        );
        assert!(matches!(
            "rsa".parse::<AsymmetricMechanism>(),
            Err(MslError::InvalidArgument(_))
        ));
        assert!("DSA".parse::<AsymmetricMechanism>().is_err());
    }

    #[test]
    fn test_mechanism_names_round_trip() {
        for mechanism in [
            AsymmetricMechanism::Rsa,
            AsymmetricMechanism::Ecc,
            AsymmetricMechanism::JweRsa,
            AsymmetricMechanism::JwejsRsa,
            AsymmetricMechanism::JwkRsa,
            AsymmetricMechanism::JwkRsaes,
        ] {
            assert_eq!(mechanism.as_str().parse::<AsymmetricMechanism>().unwrap(), mechanism);
        }
    }

    #[test]
    fn test_key_pair_debug_is_redacted() {
        let pair = KeyPair::new(vec![1u8; 32], vec![0xAB; 32]);
        let printed = format!("{:?}", pair);
        assert!(printed.contains("<redacted>"));
        assert_eq!(pair.fingerprint().len(), 16);
    }

    #[test]
    fn test_request_scheme() {
        let request = KeyRequestData::JsonWebKeyLadder {
            mechanism: LadderMechanism::Psk,
            wrap_data: None,
        };
        assert_eq!(request.scheme(), KeyExchangeScheme::JwkLadder);
        assert!(request.public_key().is_none());
    }
}
