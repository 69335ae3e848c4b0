//! User Service

use crate::error::Result;
use crate::services::base_service::BaseService;
use crate::tools::dtos::MemberModel;
use crate::tools::options::SendOptions;
use crate::Client;
use std::sync::Arc;

/// Service for the member accounts collection.
pub struct UserService {
    client: Arc<Client>,
    path: String,
}

impl UserService {
    /// Creates a new UserService.
    pub fn new(client: Arc<Client>) -> Self {
        let path = client.session().endpoints().users.clone();
        Self { client, path }
    }

    pub async fn list(&self) -> Result<Vec<MemberModel>> {
        self.request(SendOptions::get()).await
    }
}

impl BaseService for UserService {
    fn client(&self) -> &Arc<Client> {
        &self.client
    }

    fn base_path(&self) -> &str {
        &self.path
    }
}

/// Members whose name or email contains `term`, ignoring case.
pub fn filter_users(users: &[MemberModel], term: &str) -> Vec<MemberModel> {
    let term = term.trim().to_lowercase();
    users
        .iter()
        .filter(|user| {
            term.is_empty()
                || user.name.to_lowercase().contains(&term)
                || user.email.to_lowercase().contains(&term)
        })
        .cloned()
        .collect()
}
