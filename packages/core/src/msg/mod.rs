// Сообщения: политика, контекст запроса и заголовок ошибки

pub mod response;

pub use response::{classify, Response};

use crate::keyx::selector::KeyRequestSet;
use crate::keyx::KeyRequestData;
use crate::userauth::{ReauthCode, UserAuthenticationData, UserAuthenticationDataHandle};
use crate::utils::error::{MslError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

/// Security policy of one outgoing message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageConfig {
    pub encrypted: bool,
    pub integrity_protected: bool,
    pub non_replayable: bool,
    /// Local user the message is sent on behalf of
    pub user_id: Option<String>,
}

/// Everything the negotiation service needs to build one request.
///
/// The key request set is a snapshot taken at dispatch; later client
/// reconfiguration does not change it.
pub struct MessageContext {
    request_id: Uuid,
    config: MessageConfig,
    user_auth: Arc<dyn UserAuthenticationDataHandle>,
    key_requests: KeyRequestSet,
    payload: Vec<u8>,
}

impl MessageContext {
    pub fn new(
        config: MessageConfig,
        user_auth: Arc<dyn UserAuthenticationDataHandle>,
        key_requests: KeyRequestSet,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            config,
            user_auth,
            key_requests,
            payload,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn is_encrypted(&self) -> bool {
        self.config.encrypted
    }

    pub fn is_integrity_protected(&self) -> bool {
        self.config.integrity_protected
    }

    pub fn is_non_replayable(&self) -> bool {
        self.config.non_replayable
    }

    pub fn user_id(&self) -> Option<&str> {
        self.config.user_id.as_deref()
    }

    pub fn key_request_data(&self) -> &[KeyRequestData] {
        &self.key_requests
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn user_authentication_data(
        &self,
        reauth: Option<ReauthCode>,
        renewable: bool,
        required: bool,
    ) -> Option<UserAuthenticationData> {
        self.user_auth.user_authentication_data(reauth, renewable, required)
    }

    /// Write the application payload to the message body.
    pub async fn write<W>(&self, output: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        output.write_all(&self.payload).await?;
        output.flush().await?;
        Ok(())
    }
}

impl fmt::Debug for MessageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageContext")
            .field("request_id", &self.request_id)
            .field("config", &self.config)
            .field("key_requests", &self.key_requests)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

/// MSL response codes carried by an error header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ResponseCode {
    Fail,
    TransientFailure,
    EntityReauth,
    UserReauth,
    KeyxRequired,
    EntitydataReauth,
    UserdataReauth,
    Expired,
    Replayed,
    SsotokenRejected,
}

impl ResponseCode {
    pub fn code(&self) -> u8 {
        match self {
            ResponseCode::Fail => 1,
            ResponseCode::TransientFailure => 2,
            ResponseCode::EntityReauth => 3,
            ResponseCode::UserReauth => 4,
            ResponseCode::KeyxRequired => 5,
            ResponseCode::EntitydataReauth => 6,
            ResponseCode::UserdataReauth => 7,
            ResponseCode::Expired => 8,
            ResponseCode::Replayed => 9,
            ResponseCode::SsotokenRejected => 10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseCode::Fail => "FAIL",
            ResponseCode::TransientFailure => "TRANSIENT_FAILURE",
            ResponseCode::EntityReauth => "ENTITY_REAUTH",
            ResponseCode::UserReauth => "USER_REAUTH",
            ResponseCode::KeyxRequired => "KEYX_REQUIRED",
            ResponseCode::EntitydataReauth => "ENTITYDATA_REAUTH",
            ResponseCode::UserdataReauth => "USERDATA_REAUTH",
            ResponseCode::Expired => "EXPIRED",
            ResponseCode::Replayed => "REPLAYED",
            ResponseCode::SsotokenRejected => "SSOTOKEN_REJECTED",
        }
    }

    /// The remote asked for entity or user re-authentication.
    pub fn is_reauth(&self) -> bool {
        matches!(
            self,
            ResponseCode::EntityReauth
                | ResponseCode::UserReauth
                | ResponseCode::EntitydataReauth
                | ResponseCode::UserdataReauth
                | ResponseCode::SsotokenRejected
        )
    }

    /// Reason handed to the user authentication provider on retry.
    pub fn reauth_code(&self) -> Option<ReauthCode> {
        match self {
            ResponseCode::UserdataReauth => Some(ReauthCode::UserdataReauth),
            ResponseCode::SsotokenRejected => Some(ReauthCode::SsotokenRejected),
            _ => None,
        }
    }
}

impl TryFrom<u8> for ResponseCode {
    type Error = MslError;

    fn try_from(code: u8) -> Result<Self> {
        Ok(match code {
            1 => ResponseCode::Fail,
            2 => ResponseCode::TransientFailure,
            3 => ResponseCode::EntityReauth,
            4 => ResponseCode::UserReauth,
            5 => ResponseCode::KeyxRequired,
            6 => ResponseCode::EntitydataReauth,
            7 => ResponseCode::UserdataReauth,
            8 => ResponseCode::Expired,
            9 => ResponseCode::Replayed,
            10 => ResponseCode::SsotokenRejected,
            other => {
                return Err(MslError::MalformedData(format!(
                    "Unknown response code {}",
                    other
                )))
            }
        })
    }
}

impl From<ResponseCode> for u8 {
    fn from(code: ResponseCode) -> u8 {
        code.code()
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error header returned by the remote entity instead of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorHeader {
    #[serde(rename = "messageid")]
    pub message_id: u64,
    #[serde(rename = "errorcode")]
    pub error_code: ResponseCode,
    #[serde(rename = "internalcode", default, skip_serializing_if = "Option::is_none")]
    pub internal_code: Option<i64>,
    #[serde(rename = "errormsg", default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(rename = "usermsg", default, skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
}

impl ErrorHeader {
    pub fn new(message_id: u64, error_code: ResponseCode) -> Self {
        Self {
            message_id,
            error_code,
            internal_code: None,
            error_message: None,
            user_message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

impl fmt::Display for ErrorHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (message {})", self.error_code, self.message_id)?;
        if let Some(code) = self.internal_code {
            write!(f, " [{}]", code)?;
        }
        if let Some(msg) = &self.error_message {
            write!(f, ": {}", msg)?;
        }
        Ok(())
    }
}
