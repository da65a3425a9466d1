//! In-memory token storage.

use std::sync::RwLock;

use super::TokenStorage;
use crate::error::SessionError;
use crate::Result;

/// Process-local storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    token: RwLock<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStorage for MemoryStorage {
    fn save(&self, token: &str) -> Result<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|_| SessionError::LockPoisoned)?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        let slot = self.token.read().map_err(|_| SessionError::LockPoisoned)?;
        Ok(slot.clone())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|_| SessionError::LockPoisoned)?;
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_load() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_save_load_clear() {
        let storage = MemoryStorage::new();
        storage.save("abc").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("abc"));

        storage.save("def").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("def"));

        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
        storage.clear().unwrap();
    }

    #[test]
    fn test_with_token() {
        let storage = MemoryStorage::with_token("seeded");
        assert_eq!(storage.load().unwrap().as_deref(), Some("seeded"));
    }
}
