use std::{
	ffi::OsString,
	io::ErrorKind,
	path::{Path, PathBuf},
};

use time::OffsetDateTime;
use tokio::{fs, sync::Mutex};

use senti_domain::{NewRecord, SentimentRecord, newest_first};

use crate::{
	BoxFuture, Error, RecordStore, Result, StoreInfo,
	models::{StoredDocument, StoredRecord},
};

pub const DATABASE_TYPE: &str = "json_file";

/// Single JSON document rewritten on every mutation.
///
/// Every operation re-reads the file under `lock`, so the file is the only state and a failed
/// write leaves the previous document authoritative. Writes go to a sibling temp file which is
/// then renamed over the original.
pub struct JsonFileStore {
	path: PathBuf,
	lock: Mutex<()>,
}
impl JsonFileStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into(), lock: Mutex::new(()) }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	async fn initialize_inner(&self) -> Result<()> {
		let _guard = self.lock.lock().await;

		if self.read_document().await?.is_some() {
			return Ok(());
		}

		let mut document = StoredDocument::empty(OffsetDateTime::now_utc());

		self.write_document(&mut document).await?;

		tracing::info!(path = %self.path.display(), "Created sentiment store file.");

		Ok(())
	}

	async fn insert_inner(&self, record: NewRecord) -> Result<SentimentRecord> {
		let _guard = self.lock.lock().await;
		let now = OffsetDateTime::now_utc();
		let mut document =
			self.read_document().await?.unwrap_or_else(|| StoredDocument::empty(now));
		let id = document.next_id();
		let record = record.into_record(id, now);

		document.sentiment_analysis.push(StoredRecord::from(&record));
		document.metadata.last_id = id;

		self.write_document(&mut document).await?;

		tracing::info!(id, predicted_class = %record.predicted_class, "Sentiment record inserted.");

		Ok(record)
	}

	async fn list_inner(&self, limit: Option<usize>) -> Result<Vec<SentimentRecord>> {
		let document = {
			let _guard = self.lock.lock().await;

			self.read_document().await?
		};
		let Some(document) = document else {
			return Ok(Vec::new());
		};
		let mut records =
			document.sentiment_analysis.into_iter().map(SentimentRecord::from).collect::<Vec<_>>();

		newest_first(&mut records);

		if let Some(limit) = limit {
			records.truncate(limit);
		}

		Ok(records)
	}

	async fn info_inner(&self) -> Result<StoreInfo> {
		let _guard = self.lock.lock().await;
		let document = self
			.read_document()
			.await?
			.unwrap_or_else(|| StoredDocument::empty(OffsetDateTime::now_utc()));
		let file_size = match fs::metadata(&self.path).await {
			Ok(meta) => meta.len(),
			Err(err) if err.kind() == ErrorKind::NotFound => 0,
			Err(err) =>
				return Err(Error::Io { action: "stat", path: self.path.clone(), source: err }),
		};

		Ok(StoreInfo {
			total_entries: document.sentiment_analysis.len() as u64,
			created_at: document.metadata.created_at,
			last_updated: document.metadata.last_updated,
			database_type: DATABASE_TYPE.to_string(),
			file_path: Some(self.path.display().to_string()),
			file_size: Some(file_size),
			connection_status: None,
		})
	}

	async fn clear_inner(&self) -> Result<()> {
		let _guard = self.lock.lock().await;
		let now = OffsetDateTime::now_utc();
		let mut document =
			self.read_document().await?.unwrap_or_else(|| StoredDocument::empty(now));
		let removed = document.sentiment_analysis.len();

		document.metadata.last_id = document.next_id() - 1;
		document.sentiment_analysis.clear();

		self.write_document(&mut document).await?;

		tracing::info!(removed, "Sentiment store cleared.");

		Ok(())
	}

	/// `None` when the file does not exist yet.
	async fn read_document(&self) -> Result<Option<StoredDocument>> {
		let raw = match fs::read(&self.path).await {
			Ok(raw) => raw,
			Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
			Err(err) =>
				return Err(Error::Io { action: "read", path: self.path.clone(), source: err }),
		};
		let document = serde_json::from_slice(&raw)
			.map_err(|err| Error::Corrupt { path: self.path.clone(), source: err })?;

		Ok(Some(document))
	}

	async fn write_document(&self, document: &mut StoredDocument) -> Result<()> {
		document.metadata.total_entries = document.sentiment_analysis.len() as u64;
		document.metadata.last_updated = OffsetDateTime::now_utc();

		let payload = serde_json::to_vec_pretty(document)?;

		if let Some(parent) = self.path.parent()
			&& !parent.as_os_str().is_empty()
		{
			fs::create_dir_all(parent).await.map_err(|err| Error::Io {
				action: "create directory for",
				path: self.path.clone(),
				source: err,
			})?;
		}

		let tmp_path = self.tmp_path();

		if let Err(err) = fs::write(&tmp_path, &payload).await {
			let _ = fs::remove_file(&tmp_path).await;

			tracing::error!(
				error = %err,
				path = %self.path.display(),
				"Failed to write sentiment store."
			);

			return Err(Error::Io { action: "write", path: tmp_path, source: err });
		}
		if let Err(err) = fs::rename(&tmp_path, &self.path).await {
			let _ = fs::remove_file(&tmp_path).await;

			tracing::error!(
				error = %err,
				path = %self.path.display(),
				"Failed to replace sentiment store."
			);

			return Err(Error::Io { action: "replace", path: self.path.clone(), source: err });
		}

		Ok(())
	}

	fn tmp_path(&self) -> PathBuf {
		let mut raw: OsString = self.path.clone().into_os_string();

		raw.push(".tmp");

		PathBuf::from(raw)
	}
}

impl RecordStore for JsonFileStore {
	fn initialize(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(self.initialize_inner())
	}

	fn insert(&self, record: NewRecord) -> BoxFuture<'_, Result<SentimentRecord>> {
		Box::pin(self.insert_inner(record))
	}

	fn list_all(&self) -> BoxFuture<'_, Result<Vec<SentimentRecord>>> {
		Box::pin(self.list_inner(None))
	}

	fn list_recent(&self, limit: usize) -> BoxFuture<'_, Result<Vec<SentimentRecord>>> {
		Box::pin(self.list_inner(Some(limit)))
	}

	fn info(&self) -> BoxFuture<'_, Result<StoreInfo>> {
		Box::pin(self.info_inner())
	}

	fn clear_all(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(self.clear_inner())
	}
}
