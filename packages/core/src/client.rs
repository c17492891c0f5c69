//! Client - request/response interface over the MSL negotiation service
//!
//! Собирает контекст сообщения и отдаёт его в [`MslControl`].
//!
//! ## Типичный сценарий
//!
//! ```text
//! 1. client = Client::new("client1", control, msl_store)
//! 2. client.set_key_request_data("DIFFIE_HELLMAN", None)
//! 3. client.set_user_authentication_data_handle(handle)
//! 4. response = client.send_request(payload, &cfg, "https://host/path").await
//! ```
//!
//! ## Ответственность
//!
//! - Выбор схемы обмена ключами
//! - Сборка контекста запроса
//! - Классификация ответа
//!
//! ## Не отвечает за
//!
//! - Криптографию сообщений и токены (это делает negotiation service)
//! - Повторы запросов

use crate::config::Config;
use crate::context::ClientMslContext;
use crate::control::{MslControl, PendingChannel};
use crate::keyx::selector::KeyRequestSet;
use crate::keyx::{ClassicKeyPairGenerator, KeyExchangeSelector, KeyPairGenerator, KeyRequestData};
use crate::msg::{classify, MessageConfig, MessageContext, Response};
use crate::storage::{KeyStores, MslStore};
use crate::userauth::UserAuthenticationDataHandle;
use crate::utils::error::{MslError, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

pub struct Client {
    client_id: String,

    /// Контекст, общий для всех запросов
    ctx: Arc<ClientMslContext>,

    control: Arc<dyn MslControl>,

    user_auth: Option<Arc<dyn UserAuthenticationDataHandle>>,

    key_exchange: KeyExchangeSelector,

    timeout: Duration,
}

impl Client {
    /// Create a client with empty in-memory key stores.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `client_id` is blank.
    pub fn new(
        client_id: &str,
        control: Arc<dyn MslControl>,
        msl_store: Arc<dyn MslStore>,
    ) -> Result<Self> {
        Self::with_stores(
            client_id,
            control,
            msl_store,
            KeyStores::default(),
            Arc::new(ClassicKeyPairGenerator),
        )
    }

    pub fn with_stores(
        client_id: &str,
        control: Arc<dyn MslControl>,
        msl_store: Arc<dyn MslStore>,
        stores: KeyStores,
        generator: Arc<dyn KeyPairGenerator>,
    ) -> Result<Self> {
        let ctx = ClientMslContext::new(client_id, stores, msl_store)?;
        Ok(Self::with_context(ctx, control, generator))
    }

    /// Create a client from a prepared context. The client id is the
    /// context's entity identity.
    pub fn with_context(
        ctx: ClientMslContext,
        control: Arc<dyn MslControl>,
        generator: Arc<dyn KeyPairGenerator>,
    ) -> Self {
        let cfg = Config::global();
        let client_id = ctx.entity_authentication_data().identity();

        info!(
            target: "msl::client",
            client_id = %client_id,
            scheme = %ctx.entity_authentication_data().scheme(),
            "Client created"
        );

        Self {
            client_id,
            ctx: Arc::new(ctx),
            control,
            user_auth: None,
            key_exchange: KeyExchangeSelector::with_config(generator, cfg),
            timeout: cfg.request_timeout(),
        }
    }

    // === Конфигурация ===

    /// Select the key exchange scheme for subsequent requests.
    ///
    /// # Errors
    ///
    /// See [`KeyExchangeSelector::select`]. On error no key request data is
    /// configured.
    pub fn set_key_request_data(
        &mut self,
        kx_type: &str,
        mechanism: Option<&str>,
    ) -> Result<KeyRequestData> {
        let result = self.key_exchange.select(kx_type, mechanism);
        if let Err(e) = &result {
            debug!(
                target: "msl::client",
                client_id = %self.client_id,
                kx_type,
                error = %e,
                "Key request data rejected"
            );
        }
        result
    }

    pub fn set_user_authentication_data_handle(
        &mut self,
        handle: Arc<dyn UserAuthenticationDataHandle>,
    ) {
        self.user_auth = Some(handle);
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    // === Запросы ===

    /// Submit a request without waiting for the response.
    ///
    /// The key request set is captured now; reconfiguring the client
    /// afterwards does not affect this request.
    ///
    /// # Errors
    ///
    /// - `IllegalState` if no user authentication handle is set; nothing is
    ///   submitted in that case
    /// - `IllegalState` if the service cannot schedule the request (no tokio
    ///   runtime)
    pub fn dispatch(
        &self,
        payload: &[u8],
        cfg: &MessageConfig,
        remote: &str,
    ) -> Result<PendingRequest> {
        let user_auth = self.user_auth.clone().ok_or_else(|| {
            MslError::IllegalState("User authentication data handle is not set".to_string())
        })?;

        let key_requests: KeyRequestSet = self.key_exchange.active();
        let msg_ctx = MessageContext::new(cfg.clone(), user_auth, key_requests, payload.to_vec());
        let request_id = msg_ctx.request_id();

        info!(
            target: "msl::client",
            client_id = %self.client_id,
            request_id = %request_id,
            remote,
            key_requests = msg_ctx.key_request_data().len(),
            encrypted = cfg.encrypted,
            integrity_protected = cfg.integrity_protected,
            non_replayable = cfg.non_replayable,
            payload_len = payload.len(),
            "Dispatching request"
        );

        let channel = self
            .control
            .request(Arc::clone(&self.ctx), msg_ctx, remote, self.timeout)?;

        Ok(PendingRequest {
            request_id,
            channel,
        })
    }

    /// Send a request and wait for the classified response.
    pub async fn send_request(
        &self,
        payload: &[u8],
        cfg: &MessageConfig,
        remote: &str,
    ) -> Result<Response> {
        self.dispatch(payload, cfg, remote)?.response().await
    }

    // === Доступ ===

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn context(&self) -> &Arc<ClientMslContext> {
        &self.ctx
    }

    pub fn msl_store(&self) -> &Arc<dyn MslStore> {
        self.ctx.msl_store()
    }

    /// Snapshot of the configured key request data.
    pub fn key_request_data(&self) -> KeyRequestSet {
        self.key_exchange.active()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// In-flight request returned by [`Client::dispatch`].
#[derive(Debug)]
pub struct PendingRequest {
    request_id: Uuid,
    channel: PendingChannel,
}

impl PendingRequest {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Wait for the request to finish and classify the result.
    ///
    /// Errors from the negotiation service are returned unchanged.
    pub async fn response(self) -> Result<Response> {
        let request_id = self.request_id;
        let channel = self.channel.await.map_err(|e| {
            debug!(
                target: "msl::client",
                request_id = %request_id,
                error = %e,
                "Request failed"
            );
            e
        })?;
        let response = classify(channel).await?;

        let outcome = match &response {
            Response::Payload(_) => "payload",
            Response::ProtocolError(_) => "protocol_error",
            Response::NoChannel => "no_channel",
        };
        debug!(
            target: "msl::client",
            request_id = %request_id,
            outcome,
            "Request completed"
        );

        Ok(response)
    }

    /// Cancel the request. [`response`](Self::response) then yields
    /// `MslError::Interrupted`.
    pub fn abort(&self) {
        self.channel.abort();
    }
}
