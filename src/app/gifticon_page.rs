//! Gifticon management page
//!
//! Holds the loaded gifticon list together with the operator's filter and
//! sort choices, and runs the load / save / delete actions against a
//! [`GifticonApi`]. Every action clears `loading` when it finishes, whether
//! it succeeded or not.

use crate::error::{Error, Result};
use crate::services::{GifticonApi, GifticonForm};
use crate::tools::dtos::Gifticon;
use crate::tools::gifticon::{
    deletable_expired_ids, process_gifticons, toggle_sort, GifticonFilters, SortField, SortOptions,
};

pub struct GifticonPage<A> {
    api: A,
    gifticons: Vec<Gifticon>,
    filters: GifticonFilters,
    sort: SortOptions,
    loading: bool,
    error: Option<String>,
    success: Option<String>,
}

impl<A: GifticonApi> GifticonPage<A> {
    /// Creates an empty page sorted by id ascending.
    pub fn new(api: A) -> Self {
        Self {
            api,
            gifticons: Vec::new(),
            filters: GifticonFilters::default(),
            sort: SortOptions::default(),
            loading: false,
            error: None,
            success: None,
        }
    }

    /// The full list as last loaded.
    pub fn gifticons(&self) -> &[Gifticon] {
        &self.gifticons
    }

    pub fn filters(&self) -> &GifticonFilters {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: GifticonFilters) {
        self.filters = filters;
    }

    pub fn sort(&self) -> SortOptions {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortOptions) {
        self.sort = sort;
    }

    /// Header click on `field`.
    pub fn sort_by(&mut self, field: SortField) {
        self.sort = toggle_sort(self.sort, field);
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    /// The list as displayed: filtered, then sorted.
    pub fn visible(&self) -> Vec<Gifticon> {
        process_gifticons(&self.gifticons, &self.filters, &self.sort)
    }

    /// Number of expired, unsent gifticons the purge action would remove.
    pub fn deletable_expired_count(&self) -> usize {
        deletable_expired_ids(&self.gifticons).len()
    }

    pub async fn load(&mut self) -> Result<()> {
        self.begin();
        let result = self.reload().await;
        self.finish(result)
    }

    /// Validates and saves `form`, then reloads the list.
    ///
    /// Returns the backend's message.
    pub async fn save(&mut self, form: &GifticonForm) -> Result<String> {
        self.begin();
        let result = async {
            let request = form.validate()?;
            let message = self.api.save(&request).await?;
            tracing::info!("Saved gifticon {}", request.code);
            self.success = Some("Gifticon saved.".to_string());
            self.reload().await?;
            Ok::<_, Error>(message)
        }
        .await;
        self.finish(result)
    }

    /// Deletes one gifticon, then reloads. Sent gifticons are refused
    /// without a network call.
    pub async fn delete_one(&mut self, id: i64) -> Result<()> {
        self.begin();
        let result = async {
            if self.gifticons.iter().any(|g| g.id == id && g.is_sent) {
                return Err(Error::Validation(format!(
                    "gifticon {} was already sent and cannot be deleted",
                    id
                )));
            }
            self.api.delete(&[id]).await?;
            tracing::info!("Deleted gifticon {}", id);
            self.success = Some("Gifticon deleted.".to_string());
            self.reload().await
        }
        .await;
        self.finish(result)
    }

    /// Deletes every expired, unsent gifticon in the current list, then
    /// reloads. The set is computed at call time, so gifticons that expired
    /// since the last load are included.
    ///
    /// Returns the number of gifticons deleted.
    pub async fn delete_expired(&mut self) -> Result<usize> {
        self.begin();
        let result = async {
            let ids = deletable_expired_ids(&self.gifticons);
            if ids.is_empty() {
                return Ok::<_, Error>(0);
            }
            self.api.delete(&ids).await?;
            tracing::info!("Deleted {} expired gifticons", ids.len());
            self.success = Some(format!("Deleted {} expired gifticons.", ids.len()));
            self.reload().await?;
            Ok(ids.len())
        }
        .await;
        self.finish(result)
    }

    // ---------------------------------------------------------------
    // Internal helpers:
    // ---------------------------------------------------------------

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
        self.success = None;
    }

    fn finish<T>(&mut self, result: Result<T>) -> Result<T> {
        self.loading = false;
        if let Err(err) = &result {
            self.error = Some(err.to_string());
        }
        result
    }

    async fn reload(&mut self) -> Result<()> {
        self.gifticons = self.api.fetch_all().await?;
        Ok(())
    }
}

impl<A> std::fmt::Debug for GifticonPage<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifticonPage")
            .field("gifticons", &self.gifticons.len())
            .field("filters", &self.filters)
            .field("sort", &self.sort)
            .field("loading", &self.loading)
            .finish()
    }
}
