//! Entity authentication data
//!
//! Identifies the calling entity to the remote endpoint, independent of the
//! user. Serialized as an envelope:
//!
//! ```text
//! { "scheme": "NONE_SUFFIXED", "authdata": { "root": "..", "suffix": ".." } }
//! ```

pub mod suffixed;

pub use suffixed::EntityIdentity;

use crate::utils::error::{MslError, Result};
use crate::utils::validation::validate_identifier;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// JSON key entity authentication scheme.
pub const KEY_SCHEME: &str = "scheme";
/// JSON key entity authentication data.
pub const KEY_AUTHDATA: &str = "authdata";
/// JSON key entity identity.
pub const KEY_IDENTITY: &str = "identity";

/// Схемы аутентификации сущности
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityAuthenticationScheme {
    /// Pre-shared keys looked up by identity
    Psk,
    /// Unauthenticated plain identity
    None,
    /// Unauthenticated root + suffix identity
    NoneSuffixed,
}

impl EntityAuthenticationScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityAuthenticationScheme::Psk => "PSK",
            EntityAuthenticationScheme::None => "NONE",
            EntityAuthenticationScheme::NoneSuffixed => "NONE_SUFFIXED",
        }
    }
}

impl fmt::Display for EntityAuthenticationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityAuthenticationScheme {
    type Err = MslError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PSK" => Ok(EntityAuthenticationScheme::Psk),
            "NONE" => Ok(EntityAuthenticationScheme::None),
            "NONE_SUFFIXED" => Ok(EntityAuthenticationScheme::NoneSuffixed),
            other => Err(MslError::MalformedData(format!(
                "unidentified entity authentication scheme {}",
                other
            ))),
        }
    }
}

/// Entity authentication data for the supported schemes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityAuthenticationData {
    Preshared { identity: String },
    Unauthenticated { identity: String },
    UnauthenticatedSuffixed(EntityIdentity),
}

impl EntityAuthenticationData {
    pub fn preshared(identity: &str) -> Result<Self> {
        validate_identifier(identity, "Entity Identity")?;
        Ok(EntityAuthenticationData::Preshared {
            identity: identity.to_string(),
        })
    }

    pub fn unauthenticated(identity: &str) -> Result<Self> {
        validate_identifier(identity, "Entity Identity")?;
        Ok(EntityAuthenticationData::Unauthenticated {
            identity: identity.to_string(),
        })
    }

    pub fn suffixed(root: &str, suffix: &str) -> Result<Self> {
        Ok(EntityAuthenticationData::UnauthenticatedSuffixed(
            EntityIdentity::new(root, suffix)?,
        ))
    }

    /// Parse the `{scheme, authdata}` envelope.
    ///
    /// # Errors
    ///
    /// `MalformedData` on a missing or non-string scheme, an unknown scheme,
    /// a missing or non-object authdata, or scheme-specific auth data errors.
    pub fn create(envelope: &Value) -> Result<Self> {
        let scheme = envelope
            .get(KEY_SCHEME)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                MslError::MalformedData(format!("entityauthdata: missing '{}'", KEY_SCHEME))
            })?;
        let scheme = EntityAuthenticationScheme::from_str(scheme)?;

        let auth_data = envelope
            .get(KEY_AUTHDATA)
            .filter(|v| v.is_object())
            .ok_or_else(|| {
                MslError::MalformedData(format!("entityauthdata: missing '{}'", KEY_AUTHDATA))
            })?;

        match scheme {
            EntityAuthenticationScheme::Psk => Ok(EntityAuthenticationData::Preshared {
                identity: identity_field(auth_data)?,
            }),
            EntityAuthenticationScheme::None => Ok(EntityAuthenticationData::Unauthenticated {
                identity: identity_field(auth_data)?,
            }),
            EntityAuthenticationScheme::NoneSuffixed => Ok(
                EntityAuthenticationData::UnauthenticatedSuffixed(EntityIdentity::from_auth_data(
                    auth_data,
                )?),
            ),
        }
    }

    pub fn scheme(&self) -> EntityAuthenticationScheme {
        match self {
            EntityAuthenticationData::Preshared { .. } => EntityAuthenticationScheme::Psk,
            EntityAuthenticationData::Unauthenticated { .. } => EntityAuthenticationScheme::None,
            EntityAuthenticationData::UnauthenticatedSuffixed(_) => {
                EntityAuthenticationScheme::NoneSuffixed
            }
        }
    }

    /// Authenticated identity string presented to the remote endpoint.
    pub fn identity(&self) -> String {
        match self {
            EntityAuthenticationData::Preshared { identity }
            | EntityAuthenticationData::Unauthenticated { identity } => identity.clone(),
            EntityAuthenticationData::UnauthenticatedSuffixed(suffixed) => suffixed.identity(),
        }
    }

    /// Scheme-specific auth data object.
    pub fn auth_data(&self) -> Value {
        match self {
            EntityAuthenticationData::Preshared { identity }
            | EntityAuthenticationData::Unauthenticated { identity } => {
                let mut record = serde_json::Map::with_capacity(1);
                record.insert(KEY_IDENTITY.to_string(), Value::String(identity.clone()));
                Value::Object(record)
            }
            EntityAuthenticationData::UnauthenticatedSuffixed(suffixed) => suffixed.to_auth_data(),
        }
    }

    pub fn to_json(&self) -> Value {
        let mut envelope = serde_json::Map::with_capacity(2);
        envelope.insert(
            KEY_SCHEME.to_string(),
            Value::String(self.scheme().as_str().to_string()),
        );
        envelope.insert(KEY_AUTHDATA.to_string(), self.auth_data());
        Value::Object(envelope)
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

fn identity_field(auth_data: &Value) -> Result<String> {
    auth_data
        .get(KEY_IDENTITY)
        .and_then(Value::as_str)
        .filter(|identity| !identity.is_empty())
        .map(str::to_string)
        .ok_or_else(|| MslError::MalformedData(format!("authdata: missing '{}'", KEY_IDENTITY)))
}
