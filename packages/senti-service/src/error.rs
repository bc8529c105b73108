use senti_domain::SentimentRecord;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String, fields: Vec<String> },
	#[error("Storage error during {stage}: {message}")]
	Storage { stage: &'static str, message: String },
	/// The record is durable; only the post-write snapshot could not be built.
	#[error("Record {} was saved but aggregation failed: {message}", record.id)]
	Aggregation { record: Box<SentimentRecord>, message: String },
}
impl Error {
	pub(crate) fn storage(stage: &'static str, err: senti_storage::Error) -> Self {
		tracing::error!(stage, error = %err, "Sentiment store operation failed.");

		Self::Storage { stage, message: err.to_string() }
	}
}
