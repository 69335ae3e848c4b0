#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use teaming_admin::{Client, Endpoints, Route, SessionManager, TokenStore, Transport};
use wiremock::MockServer;

/// Unsigned token carrying `exp`.
pub fn token(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(json!({ "sub": "1", "exp": exp }).to_string());
    format!("{}.{}.sig", header, body)
}

pub fn valid_token(tag: &str) -> String {
    // distinct tokens with the same lifetime
    let offset = tag.bytes().map(i64::from).sum::<i64>();
    token(chrono::Utc::now().timestamp() + 3600 + offset)
}

pub fn expired_token() -> String {
    token(chrono::Utc::now().timestamp() - 60)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn admin_json() -> Value {
    json!({ "id": 1, "email": "admin@teaming.kr", "name": "Admin" })
}

pub struct Harness {
    pub client: Arc<Client>,
    pub store: TokenStore,
    pub routes: Arc<Mutex<Vec<Route>>>,
}

impl Harness {
    pub fn new(server: &MockServer) -> Self {
        let transport = Transport::new(&server.uri(), None).unwrap();
        let store = TokenStore::in_memory();
        let session = Arc::new(SessionManager::new(
            transport,
            Endpoints::default(),
            store.clone(),
        ));

        let routes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&routes);
        // dropping the returned handle leaves the callback registered
        let _ = session.on_navigate(Box::new(move |route: &Route| {
            sink.lock().unwrap().push(*route);
        }));

        Self {
            client: Client::new(session),
            store,
            routes,
        }
    }

    pub fn with_tokens(server: &MockServer, access: &str, refresh: &str) -> Self {
        let harness = Self::new(server);
        harness.store.set_access_token(access);
        harness.store.set_refresh_token(refresh);
        harness
    }

    pub fn session(&self) -> &SessionManager {
        self.client.session()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}
