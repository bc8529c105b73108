use serde::{Deserialize, Serialize};

use senti_domain::SentimentRecord;

use crate::{Error, Result, SentimentService};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListResponse {
	pub data: Vec<SentimentRecord>,
	/// Size of the whole record set, regardless of `limit`.
	pub total: u64,
}

impl SentimentService {
	pub async fn list(&self, limit: Option<usize>) -> Result<ListResponse> {
		let mut data = self.store.list_all().await.map_err(|err| Error::storage("list", err))?;
		let total = data.len() as u64;

		if let Some(limit) = limit {
			data.truncate(limit);
		}

		Ok(ListResponse { data, total })
	}

	pub async fn recent(&self, limit: usize) -> Result<Vec<SentimentRecord>> {
		self.store.list_recent(limit).await.map_err(|err| Error::storage("list", err))
	}
}
