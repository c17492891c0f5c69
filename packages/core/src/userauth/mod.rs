// User authentication
// Поставщик данных аутентификации пользователя для исходящих сообщений

use crate::storage::EmailPasswordStore;
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Why the remote endpoint asked for user re-authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReauthCode {
    /// The user authentication data was rejected
    UserdataReauth,
    /// The single-sign-on token was rejected
    SsotokenRejected,
}

/// User authentication material attached to a message.
#[derive(Clone, PartialEq, Eq)]
pub enum UserAuthenticationData {
    /// The password is wiped from memory when the data is dropped
    EmailPassword {
        email: String,
        password: Zeroizing<String>,
    },
}

impl UserAuthenticationData {
    pub fn scheme(&self) -> &'static str {
        match self {
            UserAuthenticationData::EmailPassword { .. } => "EMAIL_PASSWORD",
        }
    }
}

impl fmt::Debug for UserAuthenticationData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserAuthenticationData::EmailPassword { email, .. } => f
                .debug_struct("EmailPassword")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Supplies user authentication data on demand.
///
/// Called by the negotiation service while it builds a message; `None` means
/// no data is available and the message goes out without it.
pub trait UserAuthenticationDataHandle: Send + Sync {
    fn user_authentication_data(
        &self,
        reauth: Option<ReauthCode>,
        renewable: bool,
        required: bool,
    ) -> Option<UserAuthenticationData>;
}

/// Email/password credentials resolved from an [`EmailPasswordStore`].
pub struct EmailPasswordHandle {
    email: String,
    store: Arc<dyn EmailPasswordStore>,
}

impl EmailPasswordHandle {
    pub fn new(email: impl Into<String>, store: Arc<dyn EmailPasswordStore>) -> Self {
        Self {
            email: email.into(),
            store,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl UserAuthenticationDataHandle for EmailPasswordHandle {
    fn user_authentication_data(
        &self,
        reauth: Option<ReauthCode>,
        _renewable: bool,
        _required: bool,
    ) -> Option<UserAuthenticationData> {
        // Stored credentials were just rejected; resending them is pointless
        if reauth == Some(ReauthCode::UserdataReauth) {
            tracing::warn!(
                target: "msl::userauth",
                email = %self.email,
                "User data re-authentication requested"
            );
            return None;
        }

        let password = self.store.password(&self.email)?;
        Some(UserAuthenticationData::EmailPassword {
            email: self.email.clone(),
            password,
        })
    }
}
