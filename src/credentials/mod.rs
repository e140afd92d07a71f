//! Secure credential storage and the API-key secrets provider.
//!
//! The AI adapter never reads config fields directly; it asks a
//! [`SecretsProvider`] for the key at submit time. The default provider,
//! [`ConfigSecrets`], resolves the configured [`CredentialRef`] through a
//! [`CredentialManager`] and falls back to an environment variable.
//!
//! ```no_run
//! use screenwise::credentials::{CredentialManager, create_manager};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = create_manager();
//! let cred_ref = manager.store("ai.api_key", "AIza...")?;
//! assert!(manager.retrieve(&cred_ref)?.is_some());
//! # Ok(())
//! # }
//! ```

mod keyring_store;
mod types;

use std::sync::Arc;

pub use keyring_store::{KeyringCredentialManager, SERVICE_NAME};
pub use types::{CredentialError, CredentialRef};

/// Environment variable consulted when no key is configured.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Storage backend for secrets.
pub trait CredentialManager: Send + Sync {
    /// Store a secret under `account` and return a reference to it.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::StorageError`] if the platform store fails.
    fn store(&self, account: &str, value: &str) -> Result<CredentialRef, CredentialError>;

    /// Look up a secret.
    ///
    /// `None` refs yield `Ok(None)`; plaintext refs yield their value.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotFound`] if a keychain entry is missing.
    fn retrieve(&self, cred_ref: &CredentialRef) -> Result<Option<String>, CredentialError>;

    /// Remove a secret. Deleting something that is not there succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::StorageError`] if the platform store fails.
    fn delete(&self, cred_ref: &CredentialRef) -> Result<(), CredentialError>;
}

/// Create the platform credential manager.
#[must_use]
pub fn create_manager() -> Box<dyn CredentialManager> {
    Box::new(KeyringCredentialManager::new())
}

/// Supplies the AI backend's API key.
pub trait SecretsProvider: Send + Sync {
    /// The key, or `None` when nothing usable is configured.
    fn api_key(&self) -> Option<String>;
}

/// A fixed key, mostly for tests and embedding hosts that manage secrets
/// themselves.
#[derive(Clone, Default)]
pub struct StaticSecrets(Option<String>);

impl StaticSecrets {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Some(key.into()))
    }

    #[must_use]
    pub fn empty() -> Self {
        Self(None)
    }
}

impl std::fmt::Debug for StaticSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StaticSecrets")
            .field(&self.0.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl SecretsProvider for StaticSecrets {
    fn api_key(&self) -> Option<String> {
        self.0.clone().filter(|k| !k.trim().is_empty())
    }
}

/// Resolves the configured [`CredentialRef`], then an environment variable.
pub struct ConfigSecrets {
    cred_ref: CredentialRef,
    manager: Arc<dyn CredentialManager>,
    env_var: Option<String>,
}

impl ConfigSecrets {
    pub fn new(cred_ref: CredentialRef, manager: Arc<dyn CredentialManager>) -> Self {
        Self {
            cred_ref,
            manager,
            env_var: Some(API_KEY_ENV.to_owned()),
        }
    }

    /// Use a different fallback variable, or none at all.
    #[must_use]
    pub fn with_env_fallback(mut self, var: Option<&str>) -> Self {
        self.env_var = var.map(str::to_owned);
        self
    }
}

impl SecretsProvider for ConfigSecrets {
    fn api_key(&self) -> Option<String> {
        match self.manager.retrieve(&self.cred_ref) {
            Ok(Some(key)) if !key.trim().is_empty() => return Some(key),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "configured API key could not be resolved"),
        }

        self.env_var
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.trim().is_empty())
    }
}
