// Контекст клиента для слоя согласования
//
// Immutable after construction and shared with every request as an `Arc`.

use crate::entityauth::EntityAuthenticationData;
use crate::storage::{KeyStores, MslStore};
use crate::utils::error::Result;
use std::fmt;
use std::sync::Arc;

pub struct ClientMslContext {
    entity_auth_data: EntityAuthenticationData,
    stores: KeyStores,
    msl_store: Arc<dyn MslStore>,
}

impl ClientMslContext {
    /// Context authenticating as `client_id` with pre-shared keys.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `client_id` is blank.
    pub fn new(client_id: &str, stores: KeyStores, msl_store: Arc<dyn MslStore>) -> Result<Self> {
        Ok(Self {
            entity_auth_data: EntityAuthenticationData::preshared(client_id)?,
            stores,
            msl_store,
        })
    }

    /// Replace the entity authentication data, e.g. with a suffixed identity.
    pub fn with_entity_authentication(mut self, data: EntityAuthenticationData) -> Self {
        self.entity_auth_data = data;
        self
    }

    pub fn entity_authentication_data(&self) -> &EntityAuthenticationData {
        &self.entity_auth_data
    }

    pub fn stores(&self) -> &KeyStores {
        &self.stores
    }

    pub fn msl_store(&self) -> &Arc<dyn MslStore> {
        &self.msl_store
    }
}

impl fmt::Debug for ClientMslContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientMslContext")
            .field("entity_auth_data", &self.entity_auth_data)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entityauth::EntityAuthenticationScheme;
    use crate::storage::MemoryMslStore;

    fn context(client_id: &str) -> Result<ClientMslContext> {
        ClientMslContext::new(client_id, KeyStores::default(), Arc::new(MemoryMslStore::new()))
    }

    #[test]
    fn test_defaults_to_preshared() {
        let ctx = context("client1").unwrap();
        let data = ctx.entity_authentication_data();
        assert_eq!(data.scheme(), EntityAuthenticationScheme::Psk);
        assert_eq!(data.identity(), "client1");
    }

    #[test]
    fn test_blank_client_id() {
        let result = context("  ");
        assert!(matches!(result, Err(crate::utils::error::MslError::InvalidArgument(_))));
    }

    #[test]
    fn test_suffixed_entity_authentication() {
        let data = EntityAuthenticationData::suffixed("deviceA", "app1").unwrap();
        let ctx = context("client1").unwrap().with_entity_authentication(data);

        assert_eq!(ctx.entity_authentication_data().identity(), "deviceA.app1");
        assert!(ctx.msl_store().master_token().is_none());
    }
}
