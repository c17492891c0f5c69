//! Suffixed entity identity
//!
//! A two-part identity: a `root` (typically the device) and a `suffix`
//! (typically the application instance on that device). On the wire it is an
//! object with exactly two string fields:
//!
//! ```text
//! { "root": "deviceA", "suffix": "app1" }
//! ```
//!
//! The displayed identity is `root + "." + suffix`. The separator is not
//! escaped, so `("a.b", "c")` and `("a", "b.c")` share the display string
//! `"a.b.c"` while their records differ. Never parse the display string back
//! into parts; keep the record.

use crate::utils::error::{MslError, Result};
use crate::utils::validation::validate_non_empty;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// JSON key entity root.
pub const KEY_ROOT: &str = "root";
/// JSON key entity suffix.
pub const KEY_SUFFIX: &str = "suffix";

/// Identity concatenation character.
pub const CONCAT_CHAR: char = '.';

/// Entity identity composed of a root and a suffix.
///
/// Equality and hashing are structural over `(root, suffix)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityIdentity {
    root: String,
    suffix: String,
}

#[derive(Deserialize)]
struct SuffixedAuthData {
    root: String,
    suffix: String,
}

impl EntityIdentity {
    /// Compose an identity from explicit parts.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if either part is empty.
    pub fn new(root: impl Into<String>, suffix: impl Into<String>) -> Result<Self> {
        let root = root.into();
        let suffix = suffix.into();
        validate_non_empty(&root, "Entity root")?;
        validate_non_empty(&suffix, "Entity suffix")?;
        Ok(Self { root, suffix })
    }

    /// Decode an identity from its auth data record.
    ///
    /// Empty parts are rejected as well, not only missing ones, so a decoded
    /// identity holds the same invariant as one built with [`new`](Self::new).
    /// Extra fields are ignored.
    ///
    /// # Errors
    ///
    /// `MalformedData` if `root` or `suffix` is missing, is not a string, or
    /// is empty.
    pub fn from_auth_data(auth_data: &Value) -> Result<Self> {
        let record = SuffixedAuthData::deserialize(auth_data).map_err(|e| {
            MslError::MalformedData(format!("unauthenticated suffixed authdata: {}", e))
        })?;

        if record.root.is_empty() || record.suffix.is_empty() {
            return Err(MslError::MalformedData(
                "unauthenticated suffixed authdata: empty root or suffix".to_string(),
            ));
        }

        Ok(Self {
            root: record.root,
            suffix: record.suffix,
        })
    }

    /// Encode as `{"root": .., "suffix": ..}`.
    pub fn to_auth_data(&self) -> Value {
        let mut record = serde_json::Map::with_capacity(2);
        record.insert(KEY_ROOT.to_string(), Value::String(self.root.clone()));
        record.insert(KEY_SUFFIX.to_string(), Value::String(self.suffix.clone()));
        Value::Object(record)
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Canonical identity string, `root.suffix`.
    pub fn identity(&self) -> String {
        let mut identity = String::with_capacity(self.root.len() + 1 + self.suffix.len());
        identity.push_str(&self.root);
        identity.push(CONCAT_CHAR);
        identity.push_str(&self.suffix);
        identity
    }
}

impl fmt::Display for EntityIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.root, CONCAT_CHAR, self.suffix)
    }
}
