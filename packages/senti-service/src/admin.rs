use serde::{Deserialize, Serialize};

use senti_storage::StoreInfo;

use crate::{Error, Result, SentimentService};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClearResponse {
	pub cleared: bool,
}

impl SentimentService {
	/// Prepares the backing store and reports what it already holds.
	pub async fn initialize(&self) -> Result<StoreInfo> {
		self.store.initialize().await.map_err(|err| Error::storage("initialize", err))?;

		let info = self.info().await?;

		tracing::info!(
			database_type = %info.database_type,
			total_entries = info.total_entries,
			"Sentiment store ready."
		);

		Ok(info)
	}

	pub async fn info(&self) -> Result<StoreInfo> {
		self.store.info().await.map_err(|err| Error::storage("info", err))
	}

	pub async fn clear(&self) -> Result<ClearResponse> {
		let _gate = self.write_gate.lock().await;

		self.store.clear_all().await.map_err(|err| Error::storage("clear", err))?;

		Ok(ClearResponse { cleared: true })
	}
}
