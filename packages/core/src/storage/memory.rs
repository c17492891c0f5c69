// In-memory хранилища для тестов и простых клиентов

use crate::storage::models::*;
use crate::storage::{EmailPasswordStore, MslStore, PresharedKeyStore, WrapKeyStore};
use crate::utils::error::{MslError, Result};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use zeroize::Zeroizing;

struct WrapKeyEntry {
    public_key: Vec<u8>,
    private_key: Zeroizing<Vec<u8>>,
}

/// In-memory хранилище ключей и учётных данных
///
/// Populated up front, read-only afterwards.
#[derive(Default)]
pub struct MemoryKeyStore {
    preshared: HashMap<String, PresharedKeys>,
    wrap_keys: HashMap<String, WrapKeyEntry>,
    users: HashMap<String, Zeroizing<String>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    // === Pre-shared ключи ===

    pub fn add_preshared_keys(&mut self, identity: impl Into<String>, keys: PresharedKeys) {
        self.preshared.insert(identity.into(), keys);
    }

    // === Ключи обёртки ===

    pub fn add_wrap_key(
        &mut self,
        identity: impl Into<String>,
        public_key: Vec<u8>,
        private_key: Vec<u8>,
    ) {
        self.wrap_keys.insert(
            identity.into(),
            WrapKeyEntry {
                public_key,
                private_key: Zeroizing::new(private_key),
            },
        );
    }

    // === Пользователи ===

    pub fn add_user(&mut self, email: impl Into<String>, password: impl Into<String>) {
        self.users.insert(email.into(), Zeroizing::new(password.into()));
    }
}

impl PresharedKeyStore for MemoryKeyStore {
    fn keys(&self, identity: &str) -> Option<PresharedKeys> {
        self.preshared.get(identity).cloned()
    }
}

impl WrapKeyStore for MemoryKeyStore {
    fn identities(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.wrap_keys.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn public_key(&self, identity: &str) -> Option<Vec<u8>> {
        self.wrap_keys.get(identity).map(|e| e.public_key.clone())
    }

    fn private_key(&self, identity: &str) -> Option<Zeroizing<Vec<u8>>> {
        self.wrap_keys.get(identity).map(|e| e.private_key.clone())
    }
}

impl EmailPasswordStore for MemoryKeyStore {
    fn password(&self, email: &str) -> Option<Zeroizing<String>> {
        self.users.get(email).cloned()
    }
}

#[derive(Default)]
struct TokenState {
    /// Insertion order; later entries win ties
    crypto_contexts: Vec<(MasterToken, CryptoContext)>,
    user_id_tokens: HashMap<String, UserIdToken>,
    service_tokens: Vec<ServiceToken>,
}

/// In-memory хранилище токенов
///
/// Shared between the client and the negotiation service, so all access goes
/// through an `RwLock`.
#[derive(Default)]
pub struct MemoryMslStore {
    state: RwLock<TokenState>,
}

impl MemoryMslStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the maps half-updated
    fn read(&self) -> RwLockReadGuard<'_, TokenState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, TokenState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl MslStore for MemoryMslStore {
    fn set_crypto_context(&self, master_token: MasterToken, crypto_context: CryptoContext) {
        let mut state = self.write();
        state.crypto_contexts.retain(|(t, _)| t != &master_token);
        state.crypto_contexts.push((master_token, crypto_context));
    }

    fn master_token(&self) -> Option<MasterToken> {
        let state = self.read();
        state
            .crypto_contexts
            .iter()
            .map(|(t, _)| t)
            .fold(None, |best: Option<&MasterToken>, t| match best {
                Some(b) if b.is_newer_than(t) => Some(b),
                _ => Some(t),
            })
            .cloned()
    }

    fn crypto_context(&self, master_token: &MasterToken) -> Option<CryptoContext> {
        self.read()
            .crypto_contexts
            .iter()
            .find(|(t, _)| t == master_token)
            .map(|(_, c)| c.clone())
    }

    fn remove_crypto_context(&self, master_token: &MasterToken) {
        let mut state = self.write();
        state.crypto_contexts.retain(|(t, _)| t != master_token);

        // Bound tokens go only when no other token shares the serial number
        let serial = master_token.serial_number;
        if state
            .crypto_contexts
            .iter()
            .any(|(t, _)| t.serial_number == serial)
        {
            return;
        }
        state
            .user_id_tokens
            .retain(|_, u| u.master_token_serial_number != serial);
        state
            .service_tokens
            .retain(|s| s.master_token_serial_number != Some(serial));
    }

    fn clear_crypto_contexts(&self) {
        let mut state = self.write();
        state.crypto_contexts.clear();
        state.user_id_tokens.clear();
        state
            .service_tokens
            .retain(|s| s.master_token_serial_number.is_none());
    }

    fn add_user_id_token(&self, user_id: &str, token: UserIdToken) -> Result<()> {
        let mut state = self.write();
        let bound = state
            .crypto_contexts
            .iter()
            .any(|(t, _)| t.serial_number == token.master_token_serial_number);
        if !bound {
            return Err(MslError::IllegalState(format!(
                "User ID token for {} is not bound to a stored master token",
                user_id
            )));
        }
        state.user_id_tokens.insert(user_id.to_string(), token);
        Ok(())
    }

    fn user_id_token(&self, user_id: &str) -> Option<UserIdToken> {
        self.read().user_id_tokens.get(user_id).cloned()
    }

    fn remove_user_id_token(&self, user_id: &str) {
        self.write().user_id_tokens.remove(user_id);
    }

    fn add_service_tokens(&self, tokens: Vec<ServiceToken>) {
        let mut state = self.write();
        for token in tokens {
            state.service_tokens.retain(|s| {
                s.name != token.name
                    || s.master_token_serial_number != token.master_token_serial_number
            });
            state.service_tokens.push(token);
        }
    }

    fn service_tokens(&self, master_token: Option<&MasterToken>) -> Vec<ServiceToken> {
        let serial = master_token.map(|t| t.serial_number);
        self.read()
            .service_tokens
            .iter()
            .filter(|s| {
                s.master_token_serial_number.is_none() || s.master_token_serial_number == serial
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    // Fixtures must compare equal across calls
    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn master_token(serial_number: u64, sequence_number: u64) -> MasterToken {
        let now = fixed_now();
        MasterToken {
            identity: "client1".to_string(),
            serial_number,
            sequence_number,
            renewal_window: now + Duration::hours(1),
            expiration: now + Duration::hours(2),
        }
    }

    fn user_id_token(master_token_serial_number: u64) -> UserIdToken {
        UserIdToken {
            serial_number: 100,
            master_token_serial_number,
            expiration: fixed_now() + Duration::hours(1),
        }
    }

    fn service_token(name: &str, bound: Option<u64>) -> ServiceToken {
        ServiceToken {
            name: name.to_string(),
            data: name.as_bytes().to_vec(),
            master_token_serial_number: bound,
        }
    }

    #[test]
    fn test_key_store_lookups() {
        let mut store = MemoryKeyStore::new();
        store.add_user("alice@example.com", "secret");
        store.add_wrap_key("b", vec![1; 32], vec![2; 32]);
        store.add_wrap_key("a", vec![3; 32], vec![4; 32]);
        store.add_preshared_keys(
            "client1",
            PresharedKeys {
                encryption_key: Zeroizing::new(vec![5; 16]),
                hmac_key: Zeroizing::new(vec![6; 32]),
                wrapping_key: None,
            },
        );

        let password = store.password("alice@example.com").unwrap();
        assert_eq!(password.as_str(), "secret");
        assert!(store.password("bob@example.com").is_none());
        assert_eq!(store.identities(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.public_key("a"), Some(vec![3; 32]));
        assert_eq!(store.private_key("b").map(|k| k.to_vec()), Some(vec![2; 32]));
        assert_eq!(store.keys("client1").map(|k| k.hmac_key.len()), Some(32));
        assert!(store.keys("client2").is_none());
    }

    #[test]
    fn test_newest_master_token() {
        let store = MemoryMslStore::new();
        assert!(store.master_token().is_none());

        store.set_crypto_context(master_token(1, 2), CryptoContext::new(vec![1]));
        store.set_crypto_context(master_token(1, 1), CryptoContext::new(vec![2]));
        assert_eq!(store.master_token(), Some(master_token(1, 2)));

        store.set_crypto_context(master_token(2, 1), CryptoContext::new(vec![3]));
        assert_eq!(store.master_token(), Some(master_token(2, 1)));
        assert_eq!(
            store.crypto_context(&master_token(1, 1)).map(|c| c.as_bytes().to_vec()),
            Some(vec![2])
        );
    }

    #[test]
    fn test_user_id_token_requires_master_token() {
        let store = MemoryMslStore::new();
        let result = store.add_user_id_token("alice", user_id_token(1));
        assert!(matches!(result, Err(MslError::IllegalState(_))));

        store.set_crypto_context(master_token(1, 1), CryptoContext::new(vec![]));
        store.add_user_id_token("alice", user_id_token(1)).unwrap();
        assert_eq!(store.user_id_token("alice"), Some(user_id_token(1)));

        store.remove_user_id_token("alice");
        assert!(store.user_id_token("alice").is_none());
    }

    #[test]
    fn test_remove_crypto_context_drops_bound_tokens() {
        let store = MemoryMslStore::new();
        let token = master_token(1, 1);
        store.set_crypto_context(token.clone(), CryptoContext::new(vec![]));
        store.add_user_id_token("alice", user_id_token(1)).unwrap();
        store.add_service_tokens(vec![
            service_token("bound", Some(1)),
            service_token("free", None),
        ]);

        assert_eq!(store.service_tokens(Some(&token)).len(), 2);
        assert_eq!(store.service_tokens(None).len(), 1);

        store.remove_crypto_context(&token);

        assert!(store.master_token().is_none());
        assert!(store.user_id_token("alice").is_none());
        let remaining = store.service_tokens(None);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "free");
    }

    #[test]
    fn test_service_tokens_replace_by_name() {
        let store = MemoryMslStore::new();
        store.add_service_tokens(vec![service_token("a", None)]);
        store.add_service_tokens(vec![ServiceToken {
            data: vec![9],
            ..service_token("a", None)
        }]);

        let tokens = store.service_tokens(None);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].data, vec![9]);
    }

    #[test]
    fn test_clear_keeps_unbound_service_tokens() {
        let store = MemoryMslStore::new();
        store.set_crypto_context(master_token(1, 1), CryptoContext::new(vec![]));
        store.add_service_tokens(vec![
            service_token("bound", Some(1)),
            service_token("free", None),
        ]);

        store.clear_crypto_contexts();

        assert!(store.master_token().is_none());
        assert_eq!(store.service_tokens(Some(&master_token(1, 1))).len(), 1);
    }
}
