//! Stats Service

use crate::error::Result;
use crate::services::base_service::BaseService;
use crate::tools::dtos::DashboardStats;
use crate::tools::options::SendOptions;
use crate::Client;
use std::sync::Arc;

/// Service for the dashboard statistics endpoint.
pub struct StatsService {
    client: Arc<Client>,
    path: String,
}

impl StatsService {
    /// Creates a new StatsService.
    pub fn new(client: Arc<Client>) -> Self {
        let path = client.session().endpoints().dashboard_stats.clone();
        Self { client, path }
    }

    /// Fetches the dashboard headline numbers.
    pub async fn dashboard(&self) -> Result<DashboardStats> {
        self.request(SendOptions::get()).await
    }
}

impl BaseService for StatsService {
    fn client(&self) -> &Arc<Client> {
        &self.client
    }

    fn base_path(&self) -> &str {
        &self.path
    }
}
