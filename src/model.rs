//! Data models for the URL shortener application
//!
//! This module defines the stored entity, the request payloads accepted by the
//! API, and the response shapes returned to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shortened URL as stored in the database
///
/// Serialized to JSON and kept in `TABLE_URLS` under its numeric `id`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShortUrl {
    /// Sequential identifier allocated by the store
    pub id: u64,

    /// Base-62 spelling of `id`
    pub short_key: String,

    /// The original long URL that was shortened
    pub original_url: String,

    /// Private links are left out of the unfiltered listing
    #[serde(default)]
    pub is_private: bool,

    /// After this instant the link no longer redirects
    pub expires_at: Option<DateTime<Utc>>,

    /// Reference ID of the owner, used for filtering and delete authorization
    pub created_by: Option<String>,

    /// Number of successful redirects
    #[serde(default)]
    pub click_count: u64,

    pub created_at: DateTime<Utc>,
}

impl ShortUrl {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Request payload for creating a new short URL
///
/// # Example
/// ```json
/// {
///   "url": "https://example.com/very/long/url",
///   "ref_id": "user_123",
///   "is_private": false,
///   "expiration_in_days": 30
/// }
/// ```
#[derive(Deserialize, Debug, Clone, Default)]
pub struct NewShortUrl {
    /// The original URL to be shortened
    pub url: String,

    /// Optional owner reference
    pub ref_id: Option<String>,

    #[serde(default)]
    pub is_private: bool,

    /// Lifetime of the link; `None` means it never expires
    pub expiration_in_days: Option<u32>,
}

/// Query parameters for listing URLs with pagination
///
/// # Example
/// Query string: `?ref_id=user_123&page=2&limit=20`
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ListParams {
    /// Restrict the listing to one owner (private links included)
    pub ref_id: Option<String>,

    /// Page number, starting from 1 (default: 1)
    pub page: Option<usize>,

    /// Items per page (default: 10, maximum: 100)
    pub limit: Option<usize>,
}

/// Query parameters for deleting a URL
#[derive(Deserialize, Debug, Clone, Default)]
pub struct DeleteParams {
    /// When present, must match the owner of the link
    pub ref_id: Option<String>,
}

/// A short URL as returned to API clients
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShortUrlDto {
    pub id: u64,
    pub short_key: String,
    /// Absolute public link, e.g. `http://localhost:8080/bM`
    pub short_url: String,
    pub original_url: String,
    pub is_private: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub click_count: u64,
    pub created_at: DateTime<Utc>,
}

impl ShortUrlDto {
    pub fn from_entity(entity: &ShortUrl, base_url: &str) -> Self {
        Self {
            id: entity.id,
            short_key: entity.short_key.clone(),
            short_url: format!("{}/{}", base_url, entity.short_key),
            original_url: entity.original_url.clone(),
            is_private: entity.is_private,
            expires_at: entity.expires_at,
            created_by: entity.created_by.clone(),
            click_count: entity.click_count,
            created_at: entity.created_at,
        }
    }
}

/// One page of a listing
#[derive(Serialize, Debug, Clone)]
pub struct Page<T> {
    pub page: usize,
    pub limit: usize,
    pub total_fetched: usize,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            page: self.page,
            limit: self.limit,
            total_fetched: self.total_fetched,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}
