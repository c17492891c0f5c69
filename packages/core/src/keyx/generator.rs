//! Defines the KeyPairGenerator trait, the seam to the key generation
//! primitives used by key exchange requests.

use crate::error::CryptoError;
use crate::keyx::request::KeyPair;
use rand::rngs::OsRng;
use rand::RngCore;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroize;

/// Parameter group supported by [`ClassicKeyPairGenerator`].
pub const X25519_PARAMETERS_ID: &str = "x25519";

/// Generates the key pairs announced in key request data.
///
/// Implementations may be slow (large RSA moduli); callers decide what to
/// cache.
pub trait KeyPairGenerator: Send + Sync {
    /// Generates an ephemeral Diffie-Hellman key pair in the named group.
    fn generate_dh_key_pair(&self, parameters_id: &str) -> Result<KeyPair, CryptoError>;

    /// Generates a key pair for asymmetric wrapped key exchange.
    fn generate_wrap_key_pair(&self) -> Result<KeyPair, CryptoError>;
}

/// Classic suite: X25519 for both Diffie-Hellman and wrap key pairs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassicKeyPairGenerator;

impl ClassicKeyPairGenerator {
    fn generate_x25519() -> Result<KeyPair, CryptoError> {
        let mut seed = [0u8; 32];
        OsRng.try_fill_bytes(&mut seed)?;
        let secret = StaticSecret::from(seed);
        seed.zeroize();
        let public = PublicKey::from(&secret);
        Ok(KeyPair::new(public.to_bytes().to_vec(), secret.to_bytes().to_vec()))
    }
}

impl KeyPairGenerator for ClassicKeyPairGenerator {
    fn generate_dh_key_pair(&self, parameters_id: &str) -> Result<KeyPair, CryptoError> {
        if !parameters_id.eq_ignore_ascii_case(X25519_PARAMETERS_ID) {
            return Err(CryptoError::UnsupportedParameters(parameters_id.to_string()));
        }
        Self::generate_x25519()
    }

    fn generate_wrap_key_pair(&self) -> Result<KeyPair, CryptoError> {
        Self::generate_x25519()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_dh_key_pair() {
        let pair = ClassicKeyPairGenerator
            .generate_dh_key_pair(X25519_PARAMETERS_ID)
            .unwrap();
        // X25519 keys should be 32 bytes
        assert_eq!(pair.public_key().len(), 32);
        assert_eq!(pair.private_key().len(), 32);

        let secret: [u8; 32] = pair.private_key().try_into().unwrap();
        let derived = PublicKey::from(&StaticSecret::from(secret));
        assert_eq!(derived.as_bytes(), pair.public_key());
    }

    #[test]
    fn test_unknown_parameter_group() {
        let result = ClassicKeyPairGenerator.generate_dh_key_pair("modp2048");
        assert!(matches!(result, Err(CryptoError::UnsupportedParameters(_))));
    }

    #[test]
    fn test_key_pairs_are_fresh() {
        let a = ClassicKeyPairGenerator.generate_wrap_key_pair().unwrap();
        let b = ClassicKeyPairGenerator.generate_wrap_key_pair().unwrap();
        assert_ne!(a.public_key(), b.public_key());
    }
}
