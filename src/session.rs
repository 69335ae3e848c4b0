//! Session state and the session manager
//!
//! The [`SessionManager`] owns the [`Session`] value and the [`TokenStore`].
//! Consumers read snapshots and drive it through a fixed set of operations:
//! startup restore, login, logout, token refresh and invalidation.

use crate::app::route::Route;
use crate::config::Endpoints;
use crate::error::Result;
use crate::stores::TokenStore;
use crate::tools::dtos::{
    AuthTokens, LoginRequest, LoginResponse, RefreshTokenRequest, RefreshTokenResponse, User,
};
use crate::tools::jwt;
use crate::tools::options::SendOptions;
use crate::transport::Transport;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Authentication state as seen by the route guard and the pages.
///
/// `is_authenticated` implies `user` and `tokens` are both set.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub is_authenticated: bool,
    pub user: Option<User>,
    pub tokens: Option<AuthTokens>,
    pub is_loading: bool,
}

impl Default for Session {
    /// Loading and unauthenticated, as at application start.
    fn default() -> Self {
        Self {
            is_authenticated: false,
            user: None,
            tokens: None,
            is_loading: true,
        }
    }
}

/// Session transitions.
#[derive(Debug, Clone)]
pub enum AuthAction {
    LoginStart,
    LoginSuccess { user: User, tokens: AuthTokens },
    LoginFailure,
    Logout,
    SetLoading(bool),
    UpdateUser(User),
    UpdateTokens(AuthTokens),
}

impl Session {
    /// Applies one transition.
    pub fn reduce(&mut self, action: AuthAction) {
        match action {
            AuthAction::LoginStart => self.is_loading = true,
            AuthAction::LoginSuccess { user, tokens } => {
                *self = Session {
                    is_authenticated: true,
                    user: Some(user),
                    tokens: Some(tokens),
                    is_loading: false,
                };
            }
            AuthAction::LoginFailure | AuthAction::Logout => {
                *self = Session {
                    is_authenticated: false,
                    user: None,
                    tokens: None,
                    is_loading: false,
                };
            }
            AuthAction::SetLoading(loading) => self.is_loading = loading,
            AuthAction::UpdateUser(user) => self.user = Some(user),
            AuthAction::UpdateTokens(tokens) => self.tokens = Some(tokens),
        }
    }
}

/// Callback function type for session changes.
pub type OnSessionChangeFunc = Box<dyn Fn(&Session) + Send + Sync>;

/// Callback function type for navigation signals.
pub type OnNavigateFunc = Box<dyn Fn(&Route) + Send + Sync>;

/// Subscriber list. Callbacks must not subscribe or unsubscribe from inside
/// a notification.
struct Listeners<T> {
    next_id: AtomicUsize,
    entries: Arc<RwLock<Vec<(usize, Box<dyn Fn(&T) + Send + Sync>)>>>,
}

impl<T: 'static> Listeners<T> {
    fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(0),
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    fn subscribe(&self, callback: Box<dyn Fn(&T) + Send + Sync>) -> impl FnOnce() {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, callback));

        let entries = Arc::clone(&self.entries);
        move || {
            entries
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(entry_id, _)| *entry_id != id);
        }
    }

    fn emit(&self, value: &T) {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        for (_, callback) in entries.iter() {
            callback(value);
        }
    }
}

/// Owns the session and orchestrates login, logout and token refresh.
pub struct SessionManager {
    transport: Transport,
    endpoints: Endpoints,
    store: TokenStore,
    state: RwLock<Session>,
    on_change: Listeners<Session>,
    on_navigate: Listeners<Route>,
}

impl SessionManager {
    /// Creates a manager in the initial loading state. Call
    /// [`SessionManager::initialize`] to restore a stored session.
    pub fn new(transport: Transport, endpoints: Endpoints, store: TokenStore) -> Self {
        Self {
            transport,
            endpoints,
            store,
            state: RwLock::new(Session::default()),
            on_change: Listeners::new(),
            on_navigate: Listeners::new(),
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.store
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated
    }

    /// Registers a callback invoked with the new session after every change.
    /// Returns a function that unsubscribes it.
    pub fn on_change(&self, callback: OnSessionChangeFunc) -> impl FnOnce() {
        self.on_change.subscribe(callback)
    }

    /// Registers a callback invoked whenever the session asks the shell to
    /// navigate. Returns a function that unsubscribes it.
    pub fn on_navigate(&self, callback: OnNavigateFunc) -> impl FnOnce() {
        self.on_navigate.subscribe(callback)
    }

    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    /// Restores the session from stored tokens.
    ///
    /// Without both tokens the session becomes idle immediately and no
    /// request is sent. Otherwise the profile is fetched with the stored
    /// access token; if that fails one refresh is attempted and the profile
    /// fetch is retried with the new token.
    pub async fn initialize(&self) -> Session {
        let tokens = match (self.stored_token(true), self.stored_token(false)) {
            (Some(access_token), Some(refresh_token)) => AuthTokens {
                access_token,
                refresh_token,
            },
            _ => {
                self.dispatch(AuthAction::SetLoading(false));
                return self.session();
            }
        };

        match self.fetch_current_user(&tokens.access_token).await {
            Ok(user) => self.restore(user, tokens),
            Err(err) => {
                tracing::debug!("Stored access token rejected ({}), refreshing", err);
                match self.refresh_access_token().await {
                    Some(access_token) => match self.fetch_current_user(&access_token).await {
                        Ok(user) => self.restore(
                            user,
                            AuthTokens {
                                access_token,
                                refresh_token: tokens.refresh_token,
                            },
                        ),
                        Err(err) => {
                            tracing::warn!("Could not restore session: {}", err);
                            self.store.clear_auth();
                            self.dispatch(AuthAction::Logout);
                        }
                    },
                    None => self.dispatch(AuthAction::Logout),
                }
            }
        }

        self.session()
    }

    /// Signs in, stores both tokens and loads the profile.
    ///
    /// On success the shell is asked to navigate to the dashboard. On failure
    /// any partially stored credentials are cleared and the error is returned.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<Route> {
        self.dispatch(AuthAction::LoginStart);

        match self.sign_in(credentials).await {
            Ok((user, tokens)) => {
                tracing::info!("Signed in as {}", user.email);
                self.dispatch(AuthAction::LoginSuccess { user, tokens });
                self.navigate(Route::Dashboard);
                Ok(Route::Dashboard)
            }
            Err(err) => {
                tracing::warn!("Login failed: {}", err);
                self.store.clear_auth();
                self.dispatch(AuthAction::LoginFailure);
                Err(err)
            }
        }
    }

    /// Logs out locally, after a best-effort server-side invalidation.
    pub async fn logout(&self) -> Route {
        if let Some(refresh_token) = self.stored_token(false) {
            let options = SendOptions::post()
                .with_body(serde_json::json!({ "refreshToken": refresh_token }));
            let access_token = self.stored_token(true);

            let result = self
                .transport
                .execute(&self.endpoints.log_out, &options, access_token.as_deref())
                .await
                .and_then(|response| response.error_for_status());
            if let Err(err) = result {
                tracing::warn!("Server-side logout failed: {}", err);
            }
        }

        self.store.clear_auth();
        self.dispatch(AuthAction::Logout);
        tracing::info!("Signed out");
        self.navigate(Route::Login);
        Route::Login
    }

    /// Drops the session after an unrecoverable authorization failure and
    /// sends the shell to the login boundary.
    pub fn invalidate(&self) {
        tracing::warn!("Session is no longer valid, signing out");
        self.store.clear_auth();
        self.dispatch(AuthAction::Logout);
        self.navigate(Route::Login);
    }

    pub fn update_user(&self, user: User) {
        self.store
            .set_user_info(&serde_json::to_value(&user).unwrap_or_default());
        self.dispatch(AuthAction::UpdateUser(user));
    }

    pub fn update_tokens(&self, tokens: AuthTokens) {
        self.store.set_access_token(&tokens.access_token);
        self.store.set_refresh_token(&tokens.refresh_token);
        self.dispatch(AuthAction::UpdateTokens(tokens));
    }

    // ---------------------------------------------------------------
    // Tokens
    // ---------------------------------------------------------------

    /// Returns an access token usable for the next request.
    ///
    /// Without a refresh token this returns `None` and sends nothing. A
    /// stored access token that still decodes as unexpired is returned as-is;
    /// otherwise it is exchanged via [`SessionManager::refresh_access_token`].
    pub async fn refresh_if_needed(&self) -> Option<String> {
        if self.stored_token(false).is_none() {
            tracing::debug!("No refresh token stored");
            return None;
        }

        if let Some(access_token) = self.stored_token(true).filter(|t| !jwt::is_expired(t)) {
            return Some(access_token);
        }

        self.refresh_access_token().await
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// Any failure clears all stored credentials and ends the session.
    pub async fn refresh_access_token(&self) -> Option<String> {
        let refresh_token = self.stored_token(false)?;

        match self.exchange_refresh_token(&refresh_token).await {
            Ok(access_token) => {
                tracing::debug!("Access token refreshed");
                self.store.set_access_token(&access_token);
                if self.is_authenticated() {
                    self.dispatch(AuthAction::UpdateTokens(AuthTokens {
                        access_token: access_token.clone(),
                        refresh_token,
                    }));
                }
                Some(access_token)
            }
            Err(err) => {
                tracing::warn!("Token refresh failed: {}", err);
                self.store.clear_auth();
                self.dispatch(AuthAction::Logout);
                None
            }
        }
    }

    // ---------------------------------------------------------------
    // Internal helpers:
    // ---------------------------------------------------------------

    fn stored_token(&self, access: bool) -> Option<String> {
        let token = if access {
            self.store.get_access_token()
        } else {
            self.store.get_refresh_token()
        };
        token.filter(|t| !t.is_empty())
    }

    fn dispatch(&self, action: AuthAction) {
        let snapshot = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let before = state.clone();
            state.reduce(action);
            if *state == before {
                return;
            }
            state.clone()
        };
        self.on_change.emit(&snapshot);
    }

    fn navigate(&self, route: Route) {
        self.on_navigate.emit(&route);
    }

    fn restore(&self, user: User, tokens: AuthTokens) {
        if let Ok(info) = serde_json::to_value(&user) {
            self.store.set_user_info(&info);
        }
        tracing::info!("Session restored for {}", user.email);
        self.dispatch(AuthAction::LoginSuccess { user, tokens });
    }

    async fn sign_in(&self, credentials: &LoginRequest) -> Result<(User, AuthTokens)> {
        let options = SendOptions::post().with_body(serde_json::to_value(credentials)?);
        let tokens: LoginResponse = self
            .transport
            .execute(&self.endpoints.sign_in, &options, None)
            .await?
            .error_for_status()?
            .json()?;

        self.store.set_access_token(&tokens.access_token);
        self.store.set_refresh_token(&tokens.refresh_token);

        let user = self.fetch_current_user(&tokens.access_token).await?;
        self.store.set_user_info(&serde_json::to_value(&user)?);

        Ok((user, tokens))
    }

    async fn fetch_current_user(&self, access_token: &str) -> Result<User> {
        self.transport
            .execute(&self.endpoints.current_user, &SendOptions::get(), Some(access_token))
            .await?
            .error_for_status()?
            .json()
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<String> {
        let options = SendOptions::post().with_body(serde_json::to_value(RefreshTokenRequest {
            refresh_token: refresh_token.to_string(),
        })?);
        let response: RefreshTokenResponse = self
            .transport
            .execute(&self.endpoints.refresh, &options, None)
            .await?
            .error_for_status()?
            .json()?;
        Ok(response.access_token)
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.session();
        f.debug_struct("SessionManager")
            .field("base_url", &self.transport.base_url())
            .field("is_authenticated", &session.is_authenticated)
            .field("is_loading", &session.is_loading)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::jwt::test_tokens::token_expiring_at;
    use std::sync::Mutex;

    fn user() -> User {
        User {
            id: 1,
            email: "admin@teaming.kr".to_string(),
            name: "Admin".to_string(),
            ..Default::default()
        }
    }

    fn tokens() -> AuthTokens {
        AuthTokens {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
        }
    }

    fn manager() -> SessionManager {
        // Port 9 is discard; nothing in these tests reaches the network.
        let transport = Transport::new("http://127.0.0.1:9", None).unwrap();
        SessionManager::new(transport, Endpoints::default(), TokenStore::in_memory())
    }

    #[test]
    fn test_initial_state() {
        let session = Session::default();
        assert!(session.is_loading);
        assert!(!session.is_authenticated);
        assert!(session.user.is_none() && session.tokens.is_none());
    }

    #[test]
    fn test_reduce_login_and_logout() {
        let mut session = Session::default();
        session.reduce(AuthAction::LoginStart);
        assert!(session.is_loading);

        session.reduce(AuthAction::LoginSuccess { user: user(), tokens: tokens() });
        assert!(session.is_authenticated && !session.is_loading);
        assert_eq!(session.user, Some(user()));

        session.reduce(AuthAction::UpdateTokens(AuthTokens {
            access_token: "a2".into(),
            refresh_token: "r".into(),
        }));
        assert_eq!(session.tokens.as_ref().unwrap().access_token, "a2");

        session.reduce(AuthAction::Logout);
        assert_eq!(
            session,
            Session { is_authenticated: false, user: None, tokens: None, is_loading: false }
        );
    }

    #[tokio::test]
    async fn test_initialize_without_tokens_goes_idle() {
        let manager = manager();
        let session = manager.initialize().await;
        assert!(!session.is_authenticated);
        assert!(!session.is_loading);
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token() {
        let manager = manager();
        manager.token_store().set_access_token("stale");
        assert!(manager.refresh_if_needed().await.is_none());
        assert!(manager.refresh_access_token().await.is_none());
        // nothing was cleared because nothing was attempted
        assert_eq!(manager.token_store().get_access_token().as_deref(), Some("stale"));
    }

    #[tokio::test]
    async fn test_refresh_if_needed_keeps_valid_token() {
        let manager = manager();
        let valid = token_expiring_at(chrono::Utc::now().timestamp() + 3600);
        manager.token_store().set_access_token(&valid);
        manager.token_store().set_refresh_token("r");
        assert_eq!(manager.refresh_if_needed().await, Some(valid));
    }

    #[test]
    fn test_listeners_and_unsubscribe() {
        let manager = manager();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let routes = Arc::new(Mutex::new(Vec::new()));

        let seen_cb = Arc::clone(&seen);
        let unsubscribe = manager.on_change(Box::new(move |s: &Session| {
            seen_cb.lock().unwrap().push(s.is_authenticated);
        }));
        let routes_cb = Arc::clone(&routes);
        let _keep = manager.on_navigate(Box::new(move |r: &Route| {
            routes_cb.lock().unwrap().push(*r);
        }));

        manager.dispatch(AuthAction::LoginSuccess { user: user(), tokens: tokens() });
        // no-op transition is not broadcast
        manager.dispatch(AuthAction::SetLoading(false));
        manager.invalidate();
        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
        assert_eq!(*routes.lock().unwrap(), vec![Route::Login]);

        unsubscribe();
        manager.dispatch(AuthAction::LoginSuccess { user: user(), tokens: tokens() });
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_update_user_and_tokens_persist() {
        let manager = manager();
        manager.dispatch(AuthAction::LoginSuccess { user: user(), tokens: tokens() });

        let renamed = User { name: "Root".into(), ..user() };
        manager.update_user(renamed.clone());
        manager.update_tokens(AuthTokens { access_token: "a2".into(), refresh_token: "r2".into() });

        let session = manager.session();
        assert_eq!(session.user, Some(renamed));
        assert_eq!(session.tokens.unwrap().refresh_token, "r2");
        let store = manager.token_store();
        assert_eq!(store.get_access_token().as_deref(), Some("a2"));
        assert_eq!(store.get_user_info().unwrap()["name"], "Root");
    }
}
