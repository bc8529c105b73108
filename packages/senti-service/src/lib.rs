pub mod admin;
pub mod list;
pub mod stats;
pub mod submit;

mod error;

pub use admin::ClearResponse;
pub use error::{Error, Result};
pub use list::ListResponse;
pub use stats::OverviewResponse;
pub use submit::{SubmitRequest, SubmitResponse};

use std::sync::Arc;

use tokio::sync::Mutex;

use senti_storage::RecordStore;

/// Entry point for the API layer. Owns the store handle built at startup.
pub struct SentimentService {
	store: Arc<dyn RecordStore>,
	// Serializes submit against clear so a submit never reports a snapshot with a clear wedged
	// between its insert and its aggregation.
	write_gate: Mutex<()>,
}
impl SentimentService {
	pub fn new(store: Arc<dyn RecordStore>) -> Self {
		Self { store, write_gate: Mutex::new(()) }
	}
}
