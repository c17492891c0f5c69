//! Key exchange selector
//!
//! Owns the active key request set of a client and the lazily generated
//! asymmetric wrap key pair.
//!
//! ## Контракт
//!
//! - `select` always replaces the whole set with exactly one request
//! - the set is cleared first, so a failed `select` leaves it empty
//! - Diffie-Hellman key pairs are generated on every call
//! - the asymmetric wrap key pair is generated at most once and reused
//!
//! ⚠️ Reusing the wrap key pair avoids slow key generation (4096-bit RSA)
//! on every renegotiation. Real deployments should rotate wrap keys rather
//! than reuse one for the lifetime of the client.

use crate::config::Config;
use crate::keyx::generator::KeyPairGenerator;
use crate::keyx::request::{
    AsymmetricMechanism, KeyPair, KeyRequestData, LadderMechanism, SymmetricKeyId,
};
use crate::keyx::KeyExchangeScheme;
use crate::utils::error::{MslError, Result};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Immutable snapshot of the active key request set.
pub type KeyRequestSet = Arc<[KeyRequestData]>;

pub struct KeyExchangeSelector {
    generator: Arc<dyn KeyPairGenerator>,

    /// Named parameter group for Diffie-Hellman requests
    dh_parameters_id: String,

    /// Identifier announced with the wrap key pair
    wrap_key_pair_id: String,

    /// Cached wrap key pair (генерируется один раз)
    wrap_key_pair: Option<Arc<KeyPair>>,

    active: KeyRequestSet,
}

impl KeyExchangeSelector {
    /// Create a selector using the identifiers from the global [`Config`].
    pub fn new(generator: Arc<dyn KeyPairGenerator>) -> Self {
        let cfg = Config::global();
        Self::with_config(generator, cfg)
    }

    pub fn with_config(generator: Arc<dyn KeyPairGenerator>, cfg: &Config) -> Self {
        Self {
            generator,
            dh_parameters_id: cfg.dh_parameters_id.clone(),
            wrap_key_pair_id: cfg.wrap_key_pair_id.clone(),
            wrap_key_pair: None,
            active: Arc::from(Vec::new()),
        }
    }

    /// Select the key exchange for subsequent requests.
    ///
    /// `kx_type` is a scheme name (`DIFFIE_HELLMAN`, `dh`, ...). `mechanism`
    /// is required for asymmetric wrapped exchange and ignored otherwise.
    ///
    /// # Errors
    ///
    /// - `UnsupportedKeyExchangeType` for an unknown `kx_type`
    /// - `InvalidArgument` for a missing or unknown asymmetric mechanism
    /// - `Crypto` if key generation fails
    pub fn select(&mut self, kx_type: &str, mechanism: Option<&str>) -> Result<KeyRequestData> {
        self.clear();
        let scheme = KeyExchangeScheme::from_str(kx_type)?;
        self.select_scheme(scheme, mechanism)
    }

    /// Same as [`select`](Self::select) with an already parsed scheme.
    pub fn select_scheme(
        &mut self,
        scheme: KeyExchangeScheme,
        mechanism: Option<&str>,
    ) -> Result<KeyRequestData> {
        self.clear();

        let request = match scheme {
            KeyExchangeScheme::DiffieHellman => {
                let key_pair = self.generator.generate_dh_key_pair(&self.dh_parameters_id)?;
                debug!(
                    target: "msl::keyx",
                    parameters_id = %self.dh_parameters_id,
                    fingerprint = %key_pair.fingerprint(),
                    "Generated ephemeral Diffie-Hellman key pair"
                );
                KeyRequestData::DiffieHellman {
                    parameters_id: self.dh_parameters_id.clone(),
                    key_pair,
                }
            }
            KeyExchangeScheme::SymmetricWrapped => KeyRequestData::SymmetricWrapped {
                key_id: SymmetricKeyId::Psk,
            },
            KeyExchangeScheme::AsymmetricWrapped => {
                let mechanism = mechanism.ok_or_else(|| {
                    MslError::InvalidArgument(
                        "Missing Key Wrapping Mechanism for Asymmetric Wrapped Key Exchange"
                            .to_string(),
                    )
                })?;
                let mechanism = AsymmetricMechanism::from_str(mechanism)?;
                KeyRequestData::AsymmetricWrapped {
                    key_pair_id: self.wrap_key_pair_id.clone(),
                    mechanism,
                    key_pair: self.wrap_key_pair()?,
                }
            }
            // Only the first rung of the ladder: PSK, no prior wrap data
            KeyExchangeScheme::JweLadder => KeyRequestData::JsonWebEncryptionLadder {
                mechanism: LadderMechanism::Psk,
                wrap_data: None,
            },
            KeyExchangeScheme::JwkLadder => KeyRequestData::JsonWebKeyLadder {
                mechanism: LadderMechanism::Psk,
                wrap_data: None,
            },
        };

        self.active = Arc::from(vec![request.clone()]);

        info!(
            target: "msl::keyx",
            scheme = %scheme,
            "Key request data selected"
        );

        Ok(request)
    }

    /// Snapshot of the active key request set.
    pub fn active(&self) -> KeyRequestSet {
        Arc::clone(&self.active)
    }

    /// The cached wrap key pair, if one was generated.
    pub fn cached_wrap_key_pair(&self) -> Option<&Arc<KeyPair>> {
        self.wrap_key_pair.as_ref()
    }

    fn clear(&mut self) {
        if !self.active.is_empty() {
            self.active = Arc::from(Vec::new());
        }
    }

    fn wrap_key_pair(&mut self) -> Result<Arc<KeyPair>> {
        if let Some(key_pair) = &self.wrap_key_pair {
            return Ok(Arc::clone(key_pair));
        }

        info!(target: "msl::keyx", "Generating asymmetric wrap key pair");
        let key_pair = Arc::new(self.generator.generate_wrap_key_pair()?);
        self.wrap_key_pair = Some(Arc::clone(&key_pair));
        Ok(key_pair)
    }
}
