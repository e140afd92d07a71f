//! Credential reference and error types.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Where the AI backend's API key lives.
///
/// In `config.toml` the key is written either as a bare string or as a
/// `{ service = "...", account = "..." }` table:
///
/// - `""` reads as [`CredentialRef::None`]
/// - `"AIza..."` reads as [`CredentialRef::Plaintext`]
/// - `{ service, account }` reads as [`CredentialRef::Keychain`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CredentialRef {
    /// Entry in the platform credential store.
    Keychain {
        /// Store service name, e.g. `"screenwise-credentials"`.
        service: String,
        /// Account within the service, e.g. `"ai.api_key"`.
        account: String,
    },
    /// Key written directly into the config file.
    Plaintext(String),
    /// Nothing configured.
    #[default]
    None,
}

impl Serialize for CredentialRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Plaintext(value) => serializer.serialize_str(value),
            Self::None => serializer.serialize_str(""),
            Self::Keychain { service, account } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("service", service)?;
                map.serialize_entry("account", account)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for CredentialRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RefVisitor;

        impl<'de> Visitor<'de> for RefVisitor {
            type Value = CredentialRef;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("an API key string or a { service, account } table")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<CredentialRef, E> {
                if value.is_empty() {
                    Ok(CredentialRef::None)
                } else {
                    Ok(CredentialRef::Plaintext(value.to_owned()))
                }
            }

            fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<CredentialRef, M::Error> {
                let mut service: Option<String> = Option::None;
                let mut account: Option<String> = Option::None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "service" => service = Some(map.next_value()?),
                        "account" => account = Some(map.next_value()?),
                        other => {
                            return Err(de::Error::unknown_field(other, &["service", "account"]));
                        }
                    }
                }

                match (service, account) {
                    (Some(service), Some(account)) => {
                        Ok(CredentialRef::Keychain { service, account })
                    }
                    (Option::None, _) => Err(de::Error::missing_field("service")),
                    (_, Option::None) => Err(de::Error::missing_field("account")),
                }
            }
        }

        deserializer.deserialize_any(RefVisitor)
    }
}

impl CredentialRef {
    /// Whether anything is configured at all.
    #[must_use]
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether the key lives in the platform store.
    #[must_use]
    pub fn is_keychain(&self) -> bool {
        matches!(self, Self::Keychain { .. })
    }
}

/// Errors from credential storage.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The referenced entry does not exist.
    #[error("credential not found")]
    NotFound,

    /// The platform store rejected the operation.
    #[error("credential storage error: {0}")]
    StorageError(String),
}
