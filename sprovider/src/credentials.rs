//! In-memory API key storage with separate completion and assistant namespaces.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::ProviderError;

/// Key namespace. Thread-style calls may use a different key than
/// completion-style calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyScope {
    Completion,
    Assistant,
}

#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

#[derive(Default)]
pub struct CredentialStore {
    keys: Mutex<HashMap<KeyScope, SecretString>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_api_key(
        &self,
        scope: KeyScope,
        api_key: impl Into<String>,
    ) -> Result<(), ProviderError> {
        let api_key = SecretString::new(api_key);
        if api_key.is_empty() {
            return Err(ProviderError::configuration("api key must not be empty"));
        }

        self.keys_mut()?.insert(scope, api_key);
        Ok(())
    }

    pub fn has_api_key(&self, scope: KeyScope) -> Result<bool, ProviderError> {
        Ok(self.keys_ref()?.contains_key(&scope))
    }

    pub fn api_key(&self, scope: KeyScope) -> Result<Option<SecretString>, ProviderError> {
        Ok(self.keys_ref()?.get(&scope).cloned())
    }

    /// Assistant calls fall back to the completion key when no dedicated
    /// assistant key is stored.
    pub fn resolve(&self, scope: KeyScope) -> Result<SecretString, ProviderError> {
        let keys = self.keys_ref()?;
        let key = match scope {
            KeyScope::Completion => keys.get(&KeyScope::Completion),
            KeyScope::Assistant => keys
                .get(&KeyScope::Assistant)
                .or_else(|| keys.get(&KeyScope::Completion)),
        };

        key.cloned().ok_or_else(|| {
            ProviderError::configuration(format!("no API key configured for {scope:?} requests"))
        })
    }

    pub fn clear(&self, scope: KeyScope) -> Result<bool, ProviderError> {
        Ok(self.keys_mut()?.remove(&scope).is_some())
    }

    fn keys_ref(&self) -> Result<MutexGuard<'_, HashMap<KeyScope, SecretString>>, ProviderError> {
        self.keys
            .lock()
            .map_err(|_| ProviderError::other("credential store lock poisoned"))
    }

    fn keys_mut(&self) -> Result<MutexGuard<'_, HashMap<KeyScope, SecretString>>, ProviderError> {
        self.keys
            .lock()
            .map_err(|_| ProviderError::other("credential store lock poisoned"))
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn secret_debug_is_redacted() {
        let secret = SecretString::new("sk-live-123");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(secret.expose(), "sk-live-123");
    }

    #[test]
    fn empty_key_is_rejected() {
        let store = CredentialStore::new();
        let error = store
            .set_api_key(KeyScope::Completion, "  ")
            .expect_err("blank key must fail");
        assert_eq!(error.kind, ProviderErrorKind::Configuration);
    }

    #[test]
    fn assistant_scope_falls_back_to_completion_key() {
        let store = CredentialStore::new();
        store
            .set_api_key(KeyScope::Completion, "sk-completion")
            .expect("key should set");

        let resolved = store.resolve(KeyScope::Assistant).expect("fallback key");
        assert_eq!(resolved.expose(), "sk-completion");

        store
            .set_api_key(KeyScope::Assistant, "sk-assistant")
            .expect("key should set");
        let resolved = store.resolve(KeyScope::Assistant).expect("dedicated key");
        assert_eq!(resolved.expose(), "sk-assistant");
    }

    #[test]
    fn missing_key_is_configuration_error() {
        let store = CredentialStore::new();
        let error = store
            .resolve(KeyScope::Completion)
            .expect_err("no key must fail");
        assert_eq!(error.kind, ProviderErrorKind::Configuration);
        assert!(!store.has_api_key(KeyScope::Completion).expect("lock"));
    }
}
