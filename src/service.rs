//! Link service: the business rules around short URLs
//!
//! Every operation runs in a single redb transaction. Identifiers come from
//! the store's sequence and short keys are derived from them with
//! [`crate::codec`], so a key never needs a uniqueness check of its own.

use chrono::{DateTime, Duration, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, Table};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::codec;
use crate::database::{
    allocate_id, owner_index_key, owner_index_range, TABLE_OWNER_INDEX, TABLE_URLS,
};
use crate::error::{AppError, StoreError};
use crate::model::{ListParams, NewShortUrl, Page, ShortUrl};

const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

#[derive(Clone)]
pub struct LinkService {
    db: Arc<Database>,
}

fn not_found() -> AppError {
    AppError::NotFound("URL not found".to_string())
}

fn load<T>(table: &T, id: u64) -> Result<Option<ShortUrl>, StoreError>
where
    T: ReadableTable<u64, &'static str>,
{
    match table.get(id)? {
        Some(guard) => Ok(Some(serde_json::from_str(guard.value())?)),
        None => Ok(None),
    }
}

fn store(table: &mut Table<u64, &'static str>, record: &ShortUrl) -> Result<(), StoreError> {
    let json = serde_json::to_string(record)?;
    table.insert(record.id, json.as_str())?;
    Ok(())
}

impl LinkService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Decodes `key` and rejects spellings the encoder would never produce
    ///
    /// `"ab"` decodes to the same identifier as `"b"`; only `"b"` is a valid key.
    fn key_to_id(key: &str) -> Result<u64, AppError> {
        let id = codec::decode(key).map_err(|err| {
            warn!(key, error = %err, "rejected malformed short key");
            AppError::from(err)
        })?;
        if codec::encode(id) != key {
            warn!(key, id, "rejected non-canonical short key");
            return Err(not_found());
        }
        Ok(id)
    }

    /// Creates a new short URL
    ///
    /// Allocates the next identifier, derives the key from it and writes the
    /// record together with its owner-index entry.
    pub fn create(&self, request: NewShortUrl, now: DateTime<Utc>) -> Result<ShortUrl, AppError> {
        let expires_at = match request.expiration_in_days {
            Some(0) => {
                return Err(AppError::BadRequest(
                    "expiration_in_days must be at least 1".to_string(),
                ))
            }
            Some(days) => Some(
                now.checked_add_signed(Duration::days(i64::from(days)))
                    .ok_or_else(|| {
                        AppError::BadRequest("expiration_in_days is out of range".to_string())
                    })?,
            ),
            None => None,
        };
        let owner = request.ref_id.filter(|r| !r.is_empty());

        let write_txn = self.db.begin_write().map_err(StoreError::from)?;
        let record = {
            let id = allocate_id(&write_txn)?;
            let record = ShortUrl {
                id,
                short_key: codec::encode(id),
                original_url: request.url,
                is_private: request.is_private,
                expires_at,
                created_by: owner,
                click_count: 0,
                created_at: now,
            };

            let mut urls = write_txn.open_table(TABLE_URLS).map_err(StoreError::from)?;
            store(&mut urls, &record)?;

            if let Some(owner) = &record.created_by {
                let mut index = write_txn
                    .open_table(TABLE_OWNER_INDEX)
                    .map_err(StoreError::from)?;
                index
                    .insert(owner_index_key(owner, id).as_str(), id)
                    .map_err(StoreError::from)?;
            }
            record
        };
        write_txn.commit().map_err(StoreError::from)?;

        info!(id = record.id, short_key = %record.short_key, "short url created");
        Ok(record)
    }

    /// Resolves a key for redirection and counts the click
    ///
    /// # Errors
    ///
    /// * `NotFound` - the key is malformed, non-canonical or unknown
    /// * `Gone` - the link has expired
    pub fn resolve(&self, key: &str, now: DateTime<Utc>) -> Result<ShortUrl, AppError> {
        let id = Self::key_to_id(key)?;

        let write_txn = self.db.begin_write().map_err(StoreError::from)?;
        let record = {
            let mut urls = write_txn.open_table(TABLE_URLS).map_err(StoreError::from)?;
            let mut record = load(&urls, id)?.ok_or_else(not_found)?;

            if record.is_expired(now) {
                debug!(id, short_key = key, "short url expired");
                return Err(AppError::Gone("URL has expired".to_string()));
            }

            record.click_count += 1;
            store(&mut urls, &record)?;
            record
        };
        write_txn.commit().map_err(StoreError::from)?;

        debug!(id, clicks = record.click_count, "short url resolved");
        Ok(record)
    }

    /// Looks up a key without counting a click or checking expiry
    pub fn find(&self, key: &str) -> Result<ShortUrl, AppError> {
        let id = Self::key_to_id(key)?;

        let read_txn = self.db.begin_read().map_err(StoreError::from)?;
        let urls = read_txn.open_table(TABLE_URLS).map_err(StoreError::from)?;
        load(&urls, id)?.ok_or_else(not_found)
    }

    /// Lists links page by page
    ///
    /// With a `ref_id` the owner index is walked and private links are
    /// included. Without one, only public links are returned, oldest first.
    pub fn list(&self, params: &ListParams) -> Result<Page<ShortUrl>, AppError> {
        let page = params.page.unwrap_or(1).max(1);
        let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
        let offset = (page - 1).saturating_mul(limit);

        let read_txn = self.db.begin_read().map_err(StoreError::from)?;
        let urls = read_txn.open_table(TABLE_URLS).map_err(StoreError::from)?;

        let data = match params.ref_id.as_deref().filter(|r| !r.is_empty()) {
            Some(ref_id) => {
                let index = read_txn
                    .open_table(TABLE_OWNER_INDEX)
                    .map_err(StoreError::from)?;
                let (start, end) = owner_index_range(ref_id);

                let mut records = Vec::new();
                for entry in index
                    .range(start.as_str()..end.as_str())
                    .map_err(StoreError::from)?
                    .skip(offset)
                    .take(limit)
                {
                    let (_, id) = entry.map_err(StoreError::from)?;
                    if let Some(record) = load(&urls, id.value())? {
                        records.push(record);
                    }
                }
                records
            }
            None => {
                let mut records = Vec::new();
                let mut skipped = 0;
                for entry in urls.iter().map_err(StoreError::from)? {
                    if records.len() == limit {
                        break;
                    }
                    let (_, value) = entry.map_err(StoreError::from)?;
                    let record: ShortUrl =
                        serde_json::from_str(value.value()).map_err(StoreError::from)?;
                    if record.is_private {
                        continue;
                    }
                    if skipped < offset {
                        skipped += 1;
                        continue;
                    }
                    records.push(record);
                }
                records
            }
        };

        Ok(Page {
            page,
            limit,
            total_fetched: data.len(),
            data,
        })
    }

    /// Deletes a link, checking ownership when `ref_id` is given
    ///
    /// # Errors
    ///
    /// * `NotFound` - the key is malformed or unknown
    /// * `Forbidden` - `ref_id` does not match the owner, or the link has none
    pub fn delete(&self, key: &str, ref_id: Option<&str>) -> Result<ShortUrl, AppError> {
        let id = Self::key_to_id(key)?;

        let write_txn = self.db.begin_write().map_err(StoreError::from)?;
        let record = {
            let mut urls = write_txn.open_table(TABLE_URLS).map_err(StoreError::from)?;
            let record = load(&urls, id)?.ok_or_else(not_found)?;

            if let Some(request_ref_id) = ref_id {
                match &record.created_by {
                    Some(owner) if owner == request_ref_id => {}
                    Some(_) => {
                        return Err(AppError::Forbidden(
                            "You are not authorized to delete this link".to_string(),
                        ))
                    }
                    None => {
                        return Err(AppError::Forbidden(
                            "This URL has no owner and cannot be deleted with ref_id verification"
                                .to_string(),
                        ))
                    }
                }
            }

            urls.remove(id).map_err(StoreError::from)?;

            if let Some(owner) = &record.created_by {
                let mut index = write_txn
                    .open_table(TABLE_OWNER_INDEX)
                    .map_err(StoreError::from)?;
                index
                    .remove(owner_index_key(owner, id).as_str())
                    .map_err(StoreError::from)?;
            }
            record
        };
        write_txn.commit().map_err(StoreError::from)?;

        info!(id, short_key = key, "short url deleted");
        Ok(record)
    }
}
