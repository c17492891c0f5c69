//! Key exchange negotiation
//!
//! ## Схемы
//! - **DIFFIE_HELLMAN**: ephemeral key pair, fresh for every negotiation
//! - **SYMMETRIC_WRAPPED**: session key wrapped with the pre-shared key
//! - **ASYMMETRIC_WRAPPED**: session key wrapped with a client key pair
//! - **JWE_LADDER** / **JWK_LADDER**: first rung of the wrap key ladder
//!
//! ## Модули
//! - [`request`]: key request data carried by a message
//! - [`generator`]: key pair generation seam
//! - [`selector`]: builds the active key request set

pub mod generator;
pub mod request;
pub mod selector;

pub use generator::{ClassicKeyPairGenerator, KeyPairGenerator};
pub use request::{AsymmetricMechanism, KeyPair, KeyRequestData, LadderMechanism, SymmetricKeyId};
pub use selector::KeyExchangeSelector;

use crate::utils::error::{MslError, Result};
use std::fmt;
use std::str::FromStr;

/// Supported key exchange schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyExchangeScheme {
    DiffieHellman,
    SymmetricWrapped,
    AsymmetricWrapped,
    JweLadder,
    JwkLadder,
}

impl KeyExchangeScheme {
    pub const ALL: [KeyExchangeScheme; 5] = [
        KeyExchangeScheme::DiffieHellman,
        KeyExchangeScheme::SymmetricWrapped,
        KeyExchangeScheme::AsymmetricWrapped,
        KeyExchangeScheme::JweLadder,
        KeyExchangeScheme::JwkLadder,
    ];

    /// Protocol name of the scheme.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyExchangeScheme::DiffieHellman => "DIFFIE_HELLMAN",
            KeyExchangeScheme::SymmetricWrapped => "SYMMETRIC_WRAPPED",
            KeyExchangeScheme::AsymmetricWrapped => "ASYMMETRIC_WRAPPED",
            KeyExchangeScheme::JweLadder => "JWE_LADDER",
            KeyExchangeScheme::JwkLadder => "JWK_LADDER",
        }
    }

    /// Short name used on the command line and in config files.
    pub fn short_name(&self) -> &'static str {
        match self {
            KeyExchangeScheme::DiffieHellman => "dh",
            KeyExchangeScheme::SymmetricWrapped => "sym_wrapped",
            KeyExchangeScheme::AsymmetricWrapped => "asym_wrapped",
            KeyExchangeScheme::JweLadder => "jwe_ladder",
            KeyExchangeScheme::JwkLadder => "jwk_ladder",
        }
    }
}

impl fmt::Display for KeyExchangeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyExchangeScheme {
    type Err = MslError;

    /// Accepts the protocol name or the short name.
    fn from_str(s: &str) -> Result<Self> {
        KeyExchangeScheme::ALL
            .iter()
            .copied()
            .find(|scheme| scheme.as_str() == s || scheme.short_name() == s)
            .ok_or_else(|| MslError::UnsupportedKeyExchangeType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_parsing() {
        assert_eq!(
            "DIFFIE_HELLMAN".parse::<KeyExchangeScheme>().unwrap(),
            KeyExchangeScheme::DiffieHellman
        );
        assert_eq!(
            "asym_wrapped".parse::<KeyExchangeScheme>().unwrap(),
            KeyExchangeScheme::AsymmetricWrapped
        );
        for scheme in KeyExchangeScheme::ALL {
            assert_eq!(scheme.to_string().parse::<KeyExchangeScheme>().unwrap(), scheme);
            assert_eq!(scheme.short_name().parse::<KeyExchangeScheme>().unwrap(), scheme);
        }
    }

    #[test]
    fn test_unknown_scheme() {
        assert!(matches!(
            "MQV".parse::<KeyExchangeScheme>(),
            Err(MslError::UnsupportedKeyExchangeType(_))
        ));
        assert!("".parse::<KeyExchangeScheme>().is_err());
        assert!("Dh".parse::<KeyExchangeScheme>().is_err());
    }
}
