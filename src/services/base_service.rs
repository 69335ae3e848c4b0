//! Base Service

use crate::error::Result;
use crate::tools::options::SendOptions;
use crate::Client;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Base trait for all API services.
#[async_trait]
pub trait BaseService: Send + Sync {
    /// Returns a reference to the client.
    fn client(&self) -> &Arc<Client>;

    /// Path of the backend resource this service talks to.
    fn base_path(&self) -> &str;

    /// Sends `options` to the service path and parses the JSON response.
    async fn request<T>(&self, options: SendOptions) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        self.client().send(self.base_path(), options).await
    }

    /// Sends `options` to the service path and returns the body as text.
    async fn request_text(&self, options: SendOptions) -> Result<String> {
        self.client().send_text(self.base_path(), options).await
    }
}
