use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Source tag stamped on records written through the analysis service.
pub const DEFAULT_SOURCE: &str = "web_analyzer";

pub const POSITIVE: &str = "positive";
pub const NEGATIVE: &str = "negative";
pub const NEUTRAL: &str = "neutral";

/// Labels the classifier always reports. Other labels are carried through untouched.
pub const CANONICAL_LABELS: [&str; 3] = [POSITIVE, NEGATIVE, NEUTRAL];

/// Probability per category label. Open-ended so new labels need no schema change.
pub type Probabilities = BTreeMap<String, f64>;

/// One persisted analysis result. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
	pub id: i64,
	pub text: String,
	pub predicted_class: String,
	pub confidence: f64,
	pub probabilities: Probabilities,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	pub source: String,
}

/// Insert payload. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
	pub text: String,
	pub predicted_class: String,
	pub confidence: f64,
	pub probabilities: Probabilities,
	pub source: String,
}
impl NewRecord {
	pub fn new(
		text: impl Into<String>,
		predicted_class: impl Into<String>,
		confidence: f64,
		probabilities: Probabilities,
	) -> Self {
		Self {
			text: text.into(),
			predicted_class: predicted_class.into(),
			confidence,
			probabilities,
			source: DEFAULT_SOURCE.to_string(),
		}
	}

	pub fn with_source(mut self, source: impl Into<String>) -> Self {
		self.source = source.into();

		self
	}

	pub fn into_record(self, id: i64, created_at: OffsetDateTime) -> SentimentRecord {
		SentimentRecord {
			id,
			text: self.text,
			predicted_class: self.predicted_class,
			confidence: self.confidence,
			probabilities: self.probabilities,
			created_at,
			source: self.source,
		}
	}
}

/// Orders records newest first. Equal timestamps fall back to the higher id.
pub fn newest_first(records: &mut [SentimentRecord]) {
	records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}
