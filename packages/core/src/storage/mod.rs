// Хранилища ключей, учётных данных и токенов
//
// The client core only reads from these stores. `MslStore` is written by the
// negotiation service as tokens are issued.

pub mod memory;
pub mod models;

pub use memory::{MemoryKeyStore, MemoryMslStore};
pub use models::{CryptoContext, MasterToken, PresharedKeys, ServiceToken, UserIdToken};

use crate::utils::error::Result;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Pre-shared keys by entity identity.
pub trait PresharedKeyStore: Send + Sync {
    fn keys(&self, identity: &str) -> Option<PresharedKeys>;
}

/// Asymmetric key pairs by key pair identity.
pub trait WrapKeyStore: Send + Sync {
    fn identities(&self) -> Vec<String>;
    fn public_key(&self, identity: &str) -> Option<Vec<u8>>;
    fn private_key(&self, identity: &str) -> Option<Zeroizing<Vec<u8>>>;
}

/// User credentials by email.
pub trait EmailPasswordStore: Send + Sync {
    fn password(&self, email: &str) -> Option<Zeroizing<String>>;
}

/// Master tokens, user id tokens and service tokens with their crypto
/// contexts.
pub trait MslStore: Send + Sync {
    fn set_crypto_context(&self, master_token: MasterToken, crypto_context: CryptoContext);
    /// Newest master token, if any.
    fn master_token(&self) -> Option<MasterToken>;
    fn crypto_context(&self, master_token: &MasterToken) -> Option<CryptoContext>;
    /// Also drops user id tokens and service tokens bound to the master token.
    fn remove_crypto_context(&self, master_token: &MasterToken);
    fn clear_crypto_contexts(&self);

    /// # Errors
    ///
    /// `IllegalState` if the token is not bound to a stored master token.
    fn add_user_id_token(&self, user_id: &str, token: UserIdToken) -> Result<()>;
    fn user_id_token(&self, user_id: &str) -> Option<UserIdToken>;
    fn remove_user_id_token(&self, user_id: &str);

    fn add_service_tokens(&self, tokens: Vec<ServiceToken>);
    /// Unbound tokens plus tokens bound to `master_token`.
    fn service_tokens(&self, master_token: Option<&MasterToken>) -> Vec<ServiceToken>;
}

/// Key and credential stores injected into a client.
#[derive(Clone)]
pub struct KeyStores {
    pub preshared: Arc<dyn PresharedKeyStore>,
    pub wrap_keys: Arc<dyn WrapKeyStore>,
    pub credentials: Arc<dyn EmailPasswordStore>,
}

impl KeyStores {
    /// Use one in-memory store for all three roles.
    pub fn from_memory(store: MemoryKeyStore) -> Self {
        let store = Arc::new(store);
        Self {
            preshared: store.clone(),
            wrap_keys: store.clone(),
            credentials: store,
        }
    }
}

impl Default for KeyStores {
    fn default() -> Self {
        Self::from_memory(MemoryKeyStore::new())
    }
}
