//! Durable client-side storage and the token store built on it.

mod file_storage;
mod memory_storage;
mod token_store;

pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;
pub use token_store::{TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_INFO_KEY};

/// Process-wide string key-value storage.
///
/// Implementations are plain pass-through: no expiry and no validation of
/// the stored values.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str);

    fn remove_item(&self, key: &str);

    /// Removes several keys. Implementations that can do so in one write
    /// should override this.
    fn remove_items(&self, keys: &[&str]) {
        for key in keys {
            self.remove_item(key);
        }
    }
}
