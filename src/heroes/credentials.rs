//! Bearer token persistence.

use keyring::Entry;
use std::sync::Mutex;
use tracing::{debug, warn};

const SERVICE_NAME: &str = "herocache";
const TOKEN_KEY: &str = "session-token";

/// Opaque secret storage for the API session token.
pub trait TokenStore: Send + Sync {
  fn token(&self) -> Option<String>;
  fn set_token(&self, token: &str);
  fn delete_token(&self);
}

/// Token kept in the OS keychain.
pub struct KeyringTokenStore {
  account: String,
}

impl KeyringTokenStore {
  pub fn new() -> Self {
    Self {
      account: TOKEN_KEY.to_string(),
    }
  }

  fn entry(&self) -> keyring::Result<Entry> {
    Entry::new(SERVICE_NAME, &self.account)
  }
}

impl Default for KeyringTokenStore {
  fn default() -> Self {
    Self::new()
  }
}

impl TokenStore for KeyringTokenStore {
  fn token(&self) -> Option<String> {
    match self.entry().and_then(|entry| entry.get_password()) {
      Ok(token) => Some(token),
      Err(keyring::Error::NoEntry) => None,
      Err(e) => {
        warn!(error = %e, "Failed to read token from keychain");
        None
      }
    }
  }

  fn set_token(&self, token: &str) {
    // Replace rather than stack entries
    self.delete_token();
    if let Err(e) = self.entry().and_then(|entry| entry.set_password(token)) {
      warn!(error = %e, "Failed to store token in keychain");
    }
  }

  fn delete_token(&self) {
    match self.entry().and_then(|entry| entry.delete_credential()) {
      Ok(()) | Err(keyring::Error::NoEntry) => {}
      Err(e) => debug!(error = %e, "Failed to delete token from keychain"),
    }
  }
}

/// Token held in process memory.
#[derive(Default)]
pub struct MemoryTokenStore {
  token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
  pub fn with_token(token: impl Into<String>) -> Self {
    Self {
      token: Mutex::new(Some(token.into())),
    }
  }
}

impl TokenStore for MemoryTokenStore {
  fn token(&self) -> Option<String> {
    self.token.lock().ok().and_then(|t| t.clone())
  }

  fn set_token(&self, token: &str) {
    if let Ok(mut slot) = self.token.lock() {
      *slot = Some(token.to_string());
    }
  }

  fn delete_token(&self) {
    if let Ok(mut slot) = self.token.lock() {
      *slot = None;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_memory_token_store() {
    let store = MemoryTokenStore::default();
    assert_eq!(store.token(), None);

    store.set_token("abc");
    assert_eq!(store.token().as_deref(), Some("abc"));

    store.set_token("def");
    assert_eq!(store.token().as_deref(), Some("def"));

    store.delete_token();
    assert_eq!(store.token(), None);
  }

  #[test]
  fn test_keyring_entry_uses_platform_store() {
    // Without a platform backend keyring falls back to its mock, where every
    // Entry is a fresh credential and a saved token can never be read back
    let entry = KeyringTokenStore::new().entry().unwrap();
    assert!(entry
      .get_credential()
      .downcast_ref::<keyring::mock::MockCredential>()
      .is_none());
  }

  #[test]
  fn test_with_token() {
    let store = MemoryTokenStore::with_token("seed");
    assert_eq!(store.token().as_deref(), Some("seed"));
  }
}
