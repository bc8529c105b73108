use serde::{Deserialize, Serialize};

use senti_domain::{
	CategoryStat, ChartPoint, SentimentRecord, compute_chart_series, compute_stats,
};
use senti_storage::StoreInfo;

use crate::{Error, Result, SentimentService};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OverviewResponse {
	pub statistics: Vec<CategoryStat>,
	pub chart_data: Vec<ChartPoint>,
	pub recent_entries: Vec<SentimentRecord>,
	pub database_info: StoreInfo,
}

impl SentimentService {
	pub async fn stats(&self) -> Result<Vec<CategoryStat>> {
		let records = self.all_for_aggregation().await?;

		Ok(compute_stats(&records))
	}

	pub async fn chart(&self) -> Result<Vec<ChartPoint>> {
		let records = self.all_for_aggregation().await?;

		Ok(compute_chart_series(&compute_stats(&records)))
	}

	/// Stats, chart series and the newest entries, all taken from a single read.
	pub async fn overview(&self, recent_limit: usize) -> Result<OverviewResponse> {
		let mut records = self.all_for_aggregation().await?;
		let statistics = compute_stats(&records);
		let chart_data = compute_chart_series(&statistics);

		records.truncate(recent_limit);

		let database_info = self.info().await?;

		Ok(OverviewResponse { statistics, chart_data, recent_entries: records, database_info })
	}

	async fn all_for_aggregation(&self) -> Result<Vec<SentimentRecord>> {
		self.store.list_all().await.map_err(|err| Error::storage("aggregation", err))
	}
}
