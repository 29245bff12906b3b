//! In-memory token store backed by a `HashMap` behind a `Mutex`.

use async_trait::async_trait;
use skillhub_types::{TokenKey, TokenStore, traits::Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory [`TokenStore`] implementation for testing and ephemeral use.
pub struct InMemoryTokenStore {
    data: Mutex<HashMap<TokenKey, String>>,
}

impl InMemoryTokenStore {
    /// Creates a new empty in-memory token store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get(&self, key: TokenKey) -> Result<Option<String>> {
        Ok(self.data.lock().unwrap().get(&key).cloned())
    }

    async fn set(&self, key: TokenKey, value: &str) -> Result<()> {
        self.data.lock().unwrap().insert(key, value.to_string());
        Ok(())
    }

    async fn remove(&self, key: TokenKey) -> Result<()> {
        self.data.lock().unwrap().remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillhub_types::TokenPair;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = InMemoryTokenStore::new();
        store.set(TokenKey::Access, "acc").await.unwrap();
        assert_eq!(
            store.get(TokenKey::Access).await.unwrap().as_deref(),
            Some("acc")
        );
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = InMemoryTokenStore::new();
        assert!(store.get(TokenKey::Refresh).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let store = InMemoryTokenStore::new();
        store.set(TokenKey::Access, "acc").await.unwrap();
        store.remove(TokenKey::Access).await.unwrap();
        assert!(store.get(TokenKey::Access).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite() {
        let store = InMemoryTokenStore::new();
        store.set(TokenKey::Access, "first").await.unwrap();
        store.set(TokenKey::Access, "second").await.unwrap();
        assert_eq!(
            store.get(TokenKey::Access).await.unwrap().as_deref(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn test_save_pair_keeps_old_refresh() {
        let store = InMemoryTokenStore::new();
        store.set(TokenKey::Refresh, "old-refresh").await.unwrap();
        store.save_pair(&TokenPair::new("new-access")).await.unwrap();
        assert_eq!(
            store.get(TokenKey::Access).await.unwrap().as_deref(),
            Some("new-access")
        );
        assert_eq!(
            store.get(TokenKey::Refresh).await.unwrap().as_deref(),
            Some("old-refresh")
        );
    }

    #[tokio::test]
    async fn test_save_pair_rotates_refresh() {
        let store = InMemoryTokenStore::new();
        store.set(TokenKey::Refresh, "old-refresh").await.unwrap();
        store
            .save_pair(&TokenPair::new("acc").with_refresh("new-refresh"))
            .await
            .unwrap();
        assert_eq!(
            store.get(TokenKey::Refresh).await.unwrap().as_deref(),
            Some("new-refresh")
        );
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryTokenStore::new();
        store.set(TokenKey::Access, "acc").await.unwrap();
        store.set(TokenKey::Refresh, "ref").await.unwrap();
        store.clear().await.unwrap();
        assert!(store.get(TokenKey::Access).await.unwrap().is_none());
        assert!(store.get(TokenKey::Refresh).await.unwrap().is_none());
    }
}
