//! Teaming Admin Client

use crate::config::Config;
use crate::error::{Error, Result};
use crate::services::{GifticonService, StatsService, TeamService, UserService};
use crate::session::SessionManager;
use crate::stores::TokenStore;
use crate::tools::options::SendOptions;
use crate::transport::{RawResponse, Transport};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Authenticated client for the admin backend.
///
/// Every request goes through one path: the bearer token is refreshed when
/// needed, and a `401` response triggers exactly one forced refresh and
/// retry. If that does not resolve it, the session is invalidated and the
/// call fails with [`Error::SessionExpired`].
pub struct Client {
    /// Session manager owning the tokens.
    session: Arc<SessionManager>,
}

impl Client {
    /// Creates a new client on top of an existing session manager.
    pub fn new(session: Arc<SessionManager>) -> Arc<Self> {
        Arc::new(Self { session })
    }

    /// Builds the transport, file-backed token store and session manager
    /// described by `config`.
    pub fn from_config(config: &Config) -> Result<Arc<Self>> {
        let transport = Transport::new(&config.api_base_url, config.timeout())?;
        let store = TokenStore::new(Arc::new(config.storage()));
        let session = SessionManager::new(transport, config.endpoints.clone(), store);
        Ok(Self::new(Arc::new(session)))
    }

    /// Returns the session manager.
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        self.session.transport().base_url()
    }

    /// Returns the GifticonService.
    pub fn gifticons(self: &Arc<Self>) -> GifticonService {
        GifticonService::new(Arc::clone(self))
    }

    /// Returns the StatsService.
    pub fn stats(self: &Arc<Self>) -> StatsService {
        StatsService::new(Arc::clone(self))
    }

    /// Returns the TeamService.
    pub fn teams(self: &Arc<Self>) -> TeamService {
        TeamService::new(Arc::clone(self))
    }

    /// Returns the UserService.
    pub fn users(self: &Arc<Self>) -> UserService {
        UserService::new(Arc::clone(self))
    }

    /// Sends an API HTTP request and parses the JSON response.
    ///
    /// An empty body deserializes from `null`, so `()` and `Option<_>` work
    /// for endpoints without content.
    pub async fn send<T: DeserializeOwned>(&self, path: &str, options: SendOptions) -> Result<T> {
        self.dispatch(path, &options).await?.json()
    }

    /// Sends an API HTTP request and returns the response body as text.
    pub async fn send_text(&self, path: &str, options: SendOptions) -> Result<String> {
        Ok(self.dispatch(path, &options).await?.text())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(path, SendOptions::get()).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.send(path, SendOptions::post().with_body(serde_json::to_value(body)?))
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.send(path, SendOptions::put().with_body(serde_json::to_value(body)?))
            .await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.send(path, SendOptions::patch().with_body(serde_json::to_value(body)?))
            .await
    }

    /// DELETE with an optional JSON body.
    pub async fn delete<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let mut options = SendOptions::delete();
        if let Some(body) = body {
            options = options.with_body(serde_json::to_value(body)?);
        }
        self.send(path, options).await
    }

    // ---------------------------------------------------------------
    // Internal helpers:
    // ---------------------------------------------------------------

    async fn dispatch(&self, path: &str, options: &SendOptions) -> Result<RawResponse> {
        let transport = self.session.transport();

        let token = self.session.refresh_if_needed().await;
        let response = transport.execute(path, options, token.as_deref()).await?;
        if !response.is_unauthorized() {
            return response.error_for_status();
        }

        tracing::debug!("{} was rejected, refreshing the access token once", path);
        let Some(token) = self.session.refresh_access_token().await else {
            self.session.invalidate();
            return Err(Error::SessionExpired);
        };

        let retry = transport.execute(path, options, Some(&token)).await?;
        if retry.is_unauthorized() {
            self.session.invalidate();
            return Err(Error::SessionExpired);
        }
        retry.error_for_status()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url())
            .finish()
    }
}
