pub mod db;
pub mod json_file;
pub mod models;
pub mod queries;
pub mod schema;

mod error;

pub use error::Error;

use std::{future::Future, pin::Pin, sync::Arc};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use senti_config::StorageBackend;
use senti_domain::{NewRecord, SentimentRecord};

use crate::{db::Db, json_file::JsonFileStore};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Append-only record storage. Both backends behave the same from the caller's side.
pub trait RecordStore
where
	Self: Send + Sync,
{
	/// Creates the file or schema when absent. Safe to call on a populated store.
	fn initialize(&self) -> BoxFuture<'_, Result<()>>;

	/// Assigns the next id and the creation timestamp, then persists before returning.
	fn insert(&self, record: NewRecord) -> BoxFuture<'_, Result<SentimentRecord>>;

	/// Every record, newest first.
	fn list_all(&self) -> BoxFuture<'_, Result<Vec<SentimentRecord>>>;

	/// The first `limit` records of [`RecordStore::list_all`].
	fn list_recent(&self, limit: usize) -> BoxFuture<'_, Result<Vec<SentimentRecord>>>;

	fn info(&self) -> BoxFuture<'_, Result<StoreInfo>>;

	/// Removes every record. The id high-water mark survives.
	fn clear_all(&self) -> BoxFuture<'_, Result<()>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreInfo {
	pub total_entries: u64,
	#[serde(with = "senti_domain::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "senti_domain::time_serde")]
	pub last_updated: OffsetDateTime,
	pub database_type: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file_path: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file_size: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub connection_status: Option<String>,
}

/// Builds the backend selected by `storage.backend`. The caller runs `initialize`.
pub async fn open(cfg: &senti_config::Storage) -> Result<Arc<dyn RecordStore>> {
	match cfg.backend {
		StorageBackend::JsonFile => {
			let json_file = cfg.json_file.as_ref().ok_or_else(|| {
				Error::InvalidArgument("storage.json_file is not configured.".to_string())
			})?;

			Ok(Arc::new(JsonFileStore::new(json_file.path.clone())))
		},
		StorageBackend::Postgres => {
			let postgres = cfg.postgres.as_ref().ok_or_else(|| {
				Error::InvalidArgument("storage.postgres is not configured.".to_string())
			})?;

			Ok(Arc::new(Db::connect(postgres).await?))
		},
	}
}
