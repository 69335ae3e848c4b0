//! Team Service

use crate::error::Result;
use crate::services::base_service::BaseService;
use crate::tools::dtos::TeamModel;
use crate::tools::options::SendOptions;
use crate::Client;
use std::sync::Arc;

/// Service for the teams collection.
pub struct TeamService {
    client: Arc<Client>,
    path: String,
}

impl TeamService {
    /// Creates a new TeamService.
    pub fn new(client: Arc<Client>) -> Self {
        let path = client.session().endpoints().teams.clone();
        Self { client, path }
    }

    pub async fn list(&self) -> Result<Vec<TeamModel>> {
        self.request(SendOptions::get()).await
    }
}

impl BaseService for TeamService {
    fn client(&self) -> &Arc<Client> {
        &self.client
    }

    fn base_path(&self) -> &str {
        &self.path
    }
}

/// Teams whose name or description contains `term`, ignoring case. A blank
/// term keeps every team.
pub fn filter_teams(teams: &[TeamModel], term: &str) -> Vec<TeamModel> {
    let term = term.trim().to_lowercase();
    teams
        .iter()
        .filter(|team| {
            term.is_empty()
                || team.name.to_lowercase().contains(&term)
                || team.description.to_lowercase().contains(&term)
        })
        .cloned()
        .collect()
}
