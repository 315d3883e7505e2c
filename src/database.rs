//! Database initialization and table definitions
//!
//! This module handles the setup of the embedded redb database, defines its
//! tables, and hands out the sequential identifiers short keys are built from.

use redb::{Database, ReadableTable, TableDefinition, WriteTransaction};
use std::sync::Arc;

use crate::config::Config;
use crate::error::StoreError;
use crate::service::LinkService;

/// Main table for storing short URL records
///
/// Key: sequential identifier
/// Value: JSON-serialized `ShortUrl`
///
/// Example:
/// - Key: 100
/// - Value: '{"id":100,"short_key":"bM","original_url":"https://example.com",...}'
pub const TABLE_URLS: TableDefinition<u64, &str> = TableDefinition::new("short_urls_v1");

/// Secondary index for listing the links of one owner
///
/// Key: composite key in format "{ref_id_len:010}:{ref_id}:{id:020}"
/// Value: identifier of the record in `TABLE_URLS`
///
/// The length prefix keeps one owner's entries apart from an owner whose
/// reference starts with `"{ref_id}:"`. The zero-padded identifier keeps
/// entries of one owner in creation order.
pub const TABLE_OWNER_INDEX: TableDefinition<&str, u64> = TableDefinition::new("owner_index_v2");

/// Named counters; `URL_SEQUENCE` holds the last identifier handed out
pub const TABLE_SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences_v1");

pub const URL_SEQUENCE: &str = "urls";

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub links: LinkService,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        Self {
            links: LinkService::new(Arc::new(db)),
            config: Arc::new(config),
        }
    }
}

/// Initializes the embedded database and creates required tables
///
/// # Arguments
///
/// * `db_path` - File path where the database should be stored (e.g., "data.db")
///
/// # Example
///
/// ```no_run
/// # use shortlink::database::init_db;
/// let db = init_db("data.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_URLS)?;
        write_txn.open_table(TABLE_OWNER_INDEX)?;
        write_txn.open_table(TABLE_SEQUENCES)?;
    }
    write_txn.commit()?;

    Ok(db)
}

/// Allocates the next record identifier inside `txn`
///
/// Identifiers start at 1 and are never reused. The increment only becomes
/// visible if the caller commits, so an aborted create does not burn an id.
pub fn allocate_id(txn: &WriteTransaction) -> Result<u64, StoreError> {
    let mut sequences = txn.open_table(TABLE_SEQUENCES)?;

    let last = sequences
        .get(URL_SEQUENCE)?
        .map(|guard| guard.value())
        .unwrap_or(0);
    let next = last.checked_add(1).ok_or(StoreError::SequenceExhausted)?;

    sequences.insert(URL_SEQUENCE, next)?;
    Ok(next)
}

fn owner_prefix(ref_id: &str) -> String {
    format!("{:010}:{}", ref_id.len(), ref_id)
}

/// Builds the `TABLE_OWNER_INDEX` key for one record
pub fn owner_index_key(ref_id: &str, id: u64) -> String {
    format!("{}:{:020}", owner_prefix(ref_id), id)
}

/// Bounds covering every `TABLE_OWNER_INDEX` entry of `ref_id` and nothing else
///
/// `;` sorts directly after `:`, so the half-open range holds exactly the
/// keys starting with `"{len}:{ref_id}:"`. Any other owner with the same
/// length differs somewhere inside `ref_id` and falls outside.
pub fn owner_index_range(ref_id: &str) -> (String, String) {
    let prefix = owner_prefix(ref_id);
    (format!("{}:", prefix), format!("{};", prefix))
}
