//! Gifticon Service

use crate::error::{Error, Result};
use crate::services::base_service::BaseService;
use crate::tools::dtos::{Gifticon, GifticonDeleteRequest, GifticonRequest, Grade};
use crate::tools::options::SendOptions;
use crate::Client;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Backend operations on the admin gifticon collection.
#[async_trait]
pub trait GifticonApi: Send + Sync {
    /// Returns every gifticon.
    async fn fetch_all(&self) -> Result<Vec<Gifticon>>;

    /// Saves a new gifticon. The backend answers with a free-form message.
    async fn save(&self, request: &GifticonRequest) -> Result<String>;

    /// Deletes the given gifticons. An empty id set is a no-op.
    async fn delete(&self, ids: &[i64]) -> Result<()>;
}

/// Save-gifticon input as entered by an operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GifticonForm {
    pub code: String,
    /// `YYYY-MM-DD`
    pub expiration_date: String,
    pub grade: Grade,
}

impl GifticonForm {
    pub fn new(code: impl Into<String>, expiration_date: impl Into<String>, grade: Grade) -> Self {
        Self {
            code: code.into(),
            expiration_date: expiration_date.into(),
            grade,
        }
    }

    /// Checks the form and converts it to the request body.
    pub fn validate(&self) -> Result<GifticonRequest> {
        let code = self.code.trim();
        if code.is_empty() {
            return Err(Error::Validation("gifticon code is required".to_string()));
        }

        let date = NaiveDate::parse_from_str(self.expiration_date.trim(), "%Y-%m-%d")
            .map_err(|_| {
                Error::Validation(format!(
                    "expiration date must be YYYY-MM-DD, got {:?}",
                    self.expiration_date
                ))
            })?;

        Ok(GifticonRequest {
            code: code.to_string(),
            expiration_date_str: date.format("%Y%m%d").to_string(),
            grade: self.grade,
        })
    }
}

/// Service for the admin gifticon API endpoints.
pub struct GifticonService {
    client: Arc<Client>,
    path: String,
}

impl GifticonService {
    /// Creates a new GifticonService.
    pub fn new(client: Arc<Client>) -> Self {
        let path = client.session().endpoints().gifticons.clone();
        Self { client, path }
    }

    /// Validates `form` and saves it.
    pub async fn save_form(&self, form: &GifticonForm) -> Result<String> {
        let request = form.validate()?;
        self.save(&request).await
    }
}

#[async_trait]
impl GifticonApi for GifticonService {
    async fn fetch_all(&self) -> Result<Vec<Gifticon>> {
        self.request(SendOptions::get()).await
    }

    async fn save(&self, request: &GifticonRequest) -> Result<String> {
        let options = SendOptions::post().with_body(serde_json::to_value(request)?);
        self.request_text(options).await
    }

    async fn delete(&self, ids: &[i64]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let body = GifticonDeleteRequest { ids: ids.to_vec() };
        let options = SendOptions::delete().with_body(serde_json::to_value(&body)?);
        self.request_text(options).await?;
        Ok(())
    }
}

impl BaseService for GifticonService {
    fn client(&self) -> &Arc<Client> {
        &self.client
    }

    fn base_path(&self) -> &str {
        &self.path
    }
}
