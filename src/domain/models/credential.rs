//! Opaque credential handle.
//!
//! Impersonation passwords are held as a [`SecretString`] which is zeroed on
//! drop. The value never appears in `Debug` output and serializes as a
//! redaction marker.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Marker written in place of the secret when serializing
pub const REDACTED: &str = "[REDACTED]";

/// Secret value read from configuration
pub struct Credential(SecretString);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Borrow the secret for the duration of `f`
    pub fn with_exposed<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        f(self.0.expose_secret())
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }
}

impl Clone for Credential {
    fn clone(&self) -> Self {
        Self::new(self.0.expose_secret())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}
