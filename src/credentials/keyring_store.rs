//! Platform credential storage via the `keyring` crate.
//!
//! - **macOS**: Keychain Services
//! - **Linux**: Secret Service API (GNOME Keyring, KWallet)
//! - **Windows**: Windows Credential Manager

use super::{CredentialError, CredentialManager, CredentialRef};

/// Service name for all screenwise entries in the platform store.
pub const SERVICE_NAME: &str = "screenwise-credentials";

/// Credential manager backed by the OS credential store.
#[derive(Debug, Default)]
pub struct KeyringCredentialManager;

impl KeyringCredentialManager {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn entry(service: &str, account: &str) -> Result<keyring::Entry, CredentialError> {
    keyring::Entry::new(service, account)
        .map_err(|e| CredentialError::StorageError(format!("failed to open keyring entry: {e}")))
}

impl CredentialManager for KeyringCredentialManager {
    fn store(&self, account: &str, value: &str) -> Result<CredentialRef, CredentialError> {
        entry(SERVICE_NAME, account)?
            .set_password(value)
            .map_err(|e| CredentialError::StorageError(format!("failed to store credential: {e}")))?;

        Ok(CredentialRef::Keychain {
            service: SERVICE_NAME.to_owned(),
            account: account.to_owned(),
        })
    }

    fn retrieve(&self, cred_ref: &CredentialRef) -> Result<Option<String>, CredentialError> {
        match cred_ref {
            CredentialRef::None => Ok(None),
            CredentialRef::Plaintext(value) => Ok(Some(value.clone())),
            CredentialRef::Keychain { service, account } => {
                match entry(service, account)?.get_password() {
                    Ok(secret) => Ok(Some(secret)),
                    Err(keyring::Error::NoEntry) => Err(CredentialError::NotFound),
                    Err(e) => Err(CredentialError::StorageError(format!(
                        "failed to read credential: {e}"
                    ))),
                }
            }
        }
    }

    fn delete(&self, cred_ref: &CredentialRef) -> Result<(), CredentialError> {
        let CredentialRef::Keychain { service, account } = cred_ref else {
            return Ok(());
        };
        match entry(service, account)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(CredentialError::StorageError(format!(
                "failed to delete credential: {e}"
            ))),
        }
    }
}
