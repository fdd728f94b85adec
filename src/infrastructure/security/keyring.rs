use crate::domain::error::{AppError, Result};
use keyring::Entry;

/// Reads secrets from the OS credential store under one service name.
pub struct KeyringManager {
    service: String,
}

impl KeyringManager {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    pub fn get_secret(&self, key: &str) -> Result<String> {
        let entry = Entry::new(&self.service, key)
            .map_err(|e| AppError::SecurityError(format!("Failed to create entry: {}", e)))?;

        entry
            .get_password()
            .map_err(|e| AppError::SecurityError(format!("Failed to get password: {}", e)))
    }

    /// Like `get_secret`, but a missing or unreachable entry is `None`.
    pub fn find_secret(&self, key: &str) -> Option<String> {
        match self.get_secret(key) {
            Ok(secret) if !secret.trim().is_empty() => Some(secret),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(error = %err, service = %self.service, key, "Keyring lookup failed");
                None
            }
        }
    }
}
