// Модели данных для хранилищ

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// Pre-shared keys provisioned out of band for one entity identity.
#[derive(Clone)]
pub struct PresharedKeys {
    pub encryption_key: Zeroizing<Vec<u8>>,
    pub hmac_key: Zeroizing<Vec<u8>>,
    pub wrapping_key: Option<Zeroizing<Vec<u8>>>,
}

impl fmt::Debug for PresharedKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresharedKeys")
            .field("encryption_key", &"<redacted>")
            .field("hmac_key", &"<redacted>")
            .field("has_wrapping_key", &self.wrapping_key.is_some())
            .finish()
    }
}

/// Master token issued by the server for an authenticated entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MasterToken {
    pub identity: String,
    pub serial_number: u64,
    pub sequence_number: u64,
    pub renewal_window: DateTime<Utc>,
    pub expiration: DateTime<Utc>,
}

impl MasterToken {
    /// Past the renewal window; key exchange should be requested.
    pub fn is_renewable(&self, now: DateTime<Utc>) -> bool {
        now >= self.renewal_window
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }

    /// Same serial number, higher sequence number.
    pub fn is_newer_than(&self, other: &MasterToken) -> bool {
        self.serial_number == other.serial_number && self.sequence_number > other.sequence_number
    }
}

/// User identity token bound to a master token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdToken {
    pub serial_number: u64,
    pub master_token_serial_number: u64,
    pub expiration: DateTime<Utc>,
}

/// Opaque application token, optionally bound to a master token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceToken {
    pub name: String,
    pub data: Vec<u8>,
    pub master_token_serial_number: Option<u64>,
}

/// Session crypto context associated with a master token. Not interpreted
/// by the client core.
#[derive(Clone)]
pub struct CryptoContext(Zeroizing<Vec<u8>>);

impl CryptoContext {
    pub fn new(data: Vec<u8>) -> Self {
        Self(Zeroizing::new(data))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for CryptoContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CryptoContext({} bytes)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_master_token_windows() {
        let now = Utc::now();
        let token = MasterToken {
            identity: "client1".to_string(),
            serial_number: 7,
            sequence_number: 1,
            renewal_window: now + Duration::hours(1),
            expiration: now + Duration::hours(2),
        };

        assert!(!token.is_renewable(now));
        assert!(token.is_renewable(now + Duration::minutes(90)));
        assert!(!token.is_expired(now + Duration::minutes(90)));
        assert!(token.is_expired(now + Duration::hours(2)));
    }

    #[test]
    fn test_master_token_ordering() {
        let now = Utc::now();
        let older = MasterToken {
            identity: "client1".to_string(),
            serial_number: 7,
            sequence_number: 1,
            renewal_window: now,
            expiration: now,
        };
        let newer = MasterToken {
            sequence_number: 2,
            ..older.clone()
        };
        let other = MasterToken {
            serial_number: 8,
            sequence_number: 5,
            ..older.clone()
        };

        assert!(newer.is_newer_than(&older));
        assert!(!older.is_newer_than(&newer));
        assert!(!other.is_newer_than(&older));
    }

    #[test]
    fn test_master_token_serde() {
        let now = Utc::now();
        let token = MasterToken {
            identity: "client1".to_string(),
            serial_number: 1,
            sequence_number: 1,
            renewal_window: now,
            expiration: now,
        };
        let json = serde_json::to_string(&token).unwrap();
        let parsed: MasterToken = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, token);
    }
}
