use std::sync::Arc;

use senti_service::SentimentService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<SentimentService>,
	pub environment: String,
	pub recent_entries_limit: usize,
}
impl AppState {
	pub async fn new(config: senti_config::Config) -> color_eyre::Result<Self> {
		let store = senti_storage::open(&config.storage).await?;
		let service = SentimentService::new(store);
		let info = service.initialize().await?;

		tracing::info!(
			backend = config.storage.backend.as_str(),
			total_entries = info.total_entries,
			environment = %config.service.environment,
			"Application state initialized."
		);

		Ok(Self {
			service: Arc::new(service),
			environment: config.service.environment,
			recent_entries_limit: config.api.recent_entries_limit as usize,
		})
	}
}
