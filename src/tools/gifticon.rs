//! Gifticon list pipeline
//!
//! Pure functions over an in-memory gifticon list: filtering, stable sorting
//! and the derived set of expired gifticons that may still be deleted. All
//! expiry checks are evaluated against the clock at call time; the `_at`
//! variants take that instant explicitly.

use crate::tools::dtos::{Gifticon, Grade};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sparse filter over a gifticon list. `None` matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GifticonFilters {
    pub is_expired: Option<bool>,
    pub grade: Option<Grade>,
    pub is_sent: Option<bool>,
    pub is_used: Option<bool>,
}

impl GifticonFilters {
    /// Whether any field narrows the list.
    pub fn is_active(&self) -> bool {
        self.is_expired.is_some()
            || self.grade.is_some()
            || self.is_sent.is_some()
            || self.is_used.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Id,
    ExpirationDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOptions {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortOptions {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }
}

pub fn has_active_filters(filters: &GifticonFilters) -> bool {
    filters.is_active()
}

/// Next sort after the user picks `field`: flips an ascending sort on the same
/// field to descending, otherwise sorts ascending.
pub fn toggle_sort(current: SortOptions, field: SortField) -> SortOptions {
    let order = if current.field == field && current.order == SortOrder::Asc {
        SortOrder::Desc
    } else {
        SortOrder::Asc
    };
    SortOptions { field, order }
}

pub fn is_expired_at(gifticon: &Gifticon, now: DateTime<Utc>) -> bool {
    gifticon.expiration_date < now
}

pub fn is_expired(gifticon: &Gifticon) -> bool {
    is_expired_at(gifticon, Utc::now())
}

fn matches(gifticon: &Gifticon, filters: &GifticonFilters, now: DateTime<Utc>) -> bool {
    if let Some(expired) = filters.is_expired {
        if is_expired_at(gifticon, now) != expired {
            return false;
        }
    }
    if let Some(grade) = filters.grade {
        if gifticon.grade != grade {
            return false;
        }
    }
    if let Some(sent) = filters.is_sent {
        if gifticon.is_sent != sent {
            return false;
        }
    }
    if let Some(used) = filters.is_used {
        if gifticon.is_used != used {
            return false;
        }
    }
    true
}

/// Keeps the gifticons matching every present filter field, in input order.
pub fn filter_gifticons_at(
    gifticons: &[Gifticon],
    filters: &GifticonFilters,
    now: DateTime<Utc>,
) -> Vec<Gifticon> {
    gifticons
        .iter()
        .filter(|g| matches(g, filters, now))
        .cloned()
        .collect()
}

pub fn filter_gifticons(gifticons: &[Gifticon], filters: &GifticonFilters) -> Vec<Gifticon> {
    filter_gifticons_at(gifticons, filters, Utc::now())
}

/// Returns a stably sorted copy of the list.
pub fn sort_gifticons(gifticons: &[Gifticon], sort: &SortOptions) -> Vec<Gifticon> {
    let mut sorted = gifticons.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = match sort.field {
            SortField::Id => a.id.cmp(&b.id),
            SortField::ExpirationDate => a.expiration_date.cmp(&b.expiration_date),
        };
        match sort.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    sorted
}

/// Filters, then sorts.
pub fn process_gifticons_at(
    gifticons: &[Gifticon],
    filters: &GifticonFilters,
    sort: &SortOptions,
    now: DateTime<Utc>,
) -> Vec<Gifticon> {
    sort_gifticons(&filter_gifticons_at(gifticons, filters, now), sort)
}

pub fn process_gifticons(
    gifticons: &[Gifticon],
    filters: &GifticonFilters,
    sort: &SortOptions,
) -> Vec<Gifticon> {
    process_gifticons_at(gifticons, filters, sort, Utc::now())
}

/// Ids of gifticons that are expired and were never sent.
///
/// Sent gifticons are never deletable.
pub fn deletable_expired_ids_at(gifticons: &[Gifticon], now: DateTime<Utc>) -> Vec<i64> {
    gifticons
        .iter()
        .filter(|g| is_expired_at(g, now) && !g.is_sent)
        .map(|g| g.id)
        .collect()
}

pub fn deletable_expired_ids(gifticons: &[Gifticon]) -> Vec<i64> {
    deletable_expired_ids_at(gifticons, Utc::now())
}
