//! Token Store
//!
//! Persists the access token, the refresh token and the cached user info
//! under fixed keys. Every call goes to the underlying storage; nothing is
//! cached here and no expiry is tracked.

use crate::stores::{MemoryStorage, Storage};
use std::sync::Arc;

pub const ACCESS_TOKEN_KEY: &str = "teaming_admin_access_token";
pub const REFRESH_TOKEN_KEY: &str = "teaming_admin_refresh_token";
pub const USER_INFO_KEY: &str = "teaming_admin_user_info";

#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Token store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn get_access_token(&self) -> Option<String> {
        self.storage.get_item(ACCESS_TOKEN_KEY)
    }

    pub fn set_access_token(&self, token: &str) {
        self.storage.set_item(ACCESS_TOKEN_KEY, token);
    }

    pub fn get_refresh_token(&self) -> Option<String> {
        self.storage.get_item(REFRESH_TOKEN_KEY)
    }

    pub fn set_refresh_token(&self, token: &str) {
        self.storage.set_item(REFRESH_TOKEN_KEY, token);
    }

    /// Cached user info. Entries that are not valid JSON read as `None`.
    pub fn get_user_info(&self) -> Option<serde_json::Value> {
        self.storage
            .get_item(USER_INFO_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    pub fn set_user_info(&self, user_info: &serde_json::Value) {
        self.storage.set_item(USER_INFO_KEY, &user_info.to_string());
    }

    /// Removes both tokens and the user info together.
    pub fn clear_auth(&self) {
        self.storage
            .remove_items(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_INFO_KEY]);
    }

    /// True iff both tokens are present and non-empty.
    pub fn has_tokens(&self) -> bool {
        let present = |t: Option<String>| t.is_some_and(|t| !t.is_empty());
        present(self.get_access_token()) && present(self.get_refresh_token())
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_tokens", &self.has_tokens())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::FileStorage;

    #[test]
    fn test_tokens_round_trip() {
        let store = TokenStore::in_memory();
        assert!(store.get_access_token().is_none());
        assert!(!store.has_tokens());

        store.set_access_token("access");
        assert!(!store.has_tokens());
        store.set_refresh_token("refresh");
        assert!(store.has_tokens());

        assert_eq!(store.get_access_token().as_deref(), Some("access"));
        assert_eq!(store.get_refresh_token().as_deref(), Some("refresh"));
    }

    #[test]
    fn test_empty_token_does_not_count() {
        let store = TokenStore::in_memory();
        store.set_access_token("");
        store.set_refresh_token("refresh");
        assert!(!store.has_tokens());
    }

    #[test]
    fn test_user_info() {
        let store = TokenStore::in_memory();
        let info = serde_json::json!({ "id": 1, "email": "admin@teaming.kr", "name": "Admin" });
        store.set_user_info(&info);
        assert_eq!(store.get_user_info(), Some(info));
    }

    #[test]
    fn test_clear_auth_is_idempotent() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item("unrelated", "keep");
        let store = TokenStore::new(storage.clone());

        store.set_access_token("a");
        store.set_refresh_token("r");
        store.set_user_info(&serde_json::json!({ "id": 1 }));

        store.clear_auth();
        assert_eq!(storage.len(), 1);
        store.clear_auth();
        assert_eq!(storage.len(), 1);

        assert!(store.get_access_token().is_none());
        assert!(store.get_refresh_token().is_none());
        assert!(store.get_user_info().is_none());
        assert_eq!(storage.get_item("unrelated").as_deref(), Some("keep"));
    }

    #[test]
    fn test_shared_file_storage() {
        let path = std::env::temp_dir().join(format!(
            "teaming_admin_tokens_{}.json",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));

        let writer = TokenStore::new(Arc::new(FileStorage::new(&path)));
        let reader = TokenStore::new(Arc::new(FileStorage::new(&path)));

        writer.set_access_token("a");
        writer.set_refresh_token("r");
        assert!(reader.has_tokens());

        reader.clear_auth();
        assert!(!writer.has_tokens());
        assert!(!path.exists());
    }
}
