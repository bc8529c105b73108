use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use time::OffsetDateTime;

use senti_domain::{
	DEFAULT_SOURCE, Probabilities, SentimentRecord,
	record::{NEGATIVE, NEUTRAL, POSITIVE},
};

/// Canonical probabilities pulled out of the open map, plus whatever else it carried.
#[derive(Debug, Default, PartialEq)]
pub struct SplitProbabilities {
	pub positive: Option<f64>,
	pub negative: Option<f64>,
	pub neutral: Option<f64>,
	pub other: Probabilities,
}
impl SplitProbabilities {
	pub fn split(probabilities: &Probabilities) -> Self {
		let mut split = Self::default();

		for (label, value) in probabilities {
			match label.as_str() {
				POSITIVE => split.positive = Some(*value),
				NEGATIVE => split.negative = Some(*value),
				NEUTRAL => split.neutral = Some(*value),
				_ => {
					split.other.insert(label.clone(), *value);
				},
			}
		}

		split
	}

	pub fn merge(self) -> Probabilities {
		let mut probabilities = self.other;

		let canonical = [
			(POSITIVE, self.positive),
			(NEGATIVE, self.negative),
			(NEUTRAL, self.neutral),
		];

		for (label, value) in canonical {
			if let Some(value) = value {
				probabilities.insert(label.to_string(), value);
			}
		}

		probabilities
	}
}

/// On-disk layout of the JSON file store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
	pub sentiment_analysis: Vec<StoredRecord>,
	pub metadata: StoredMetadata,
}
impl StoredDocument {
	pub fn empty(now: OffsetDateTime) -> Self {
		Self {
			sentiment_analysis: Vec::new(),
			metadata: StoredMetadata {
				created_at: now,
				total_entries: 0,
				last_updated: now,
				last_id: 0,
			},
		}
	}

	/// Ids continue past the high-water mark even after the records holding it are cleared.
	pub fn next_id(&self) -> i64 {
		let max_existing =
			self.sentiment_analysis.iter().map(|record| record.id).max().unwrap_or(0);

		max_existing.max(self.metadata.last_id) + 1
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMetadata {
	#[serde(with = "senti_domain::time_serde")]
	pub created_at: OffsetDateTime,
	pub total_entries: u64,
	#[serde(with = "senti_domain::time_serde")]
	pub last_updated: OffsetDateTime,
	/// Highest id ever issued. Missing in files written before it existed.
	#[serde(default)]
	pub last_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
	pub id: i64,
	pub text: String,
	pub predicted_class: String,
	pub confidence: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub positive_prob: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub negative_prob: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub neutral_prob: Option<f64>,
	#[serde(default, skip_serializing_if = "Probabilities::is_empty")]
	pub other_probs: Probabilities,
	#[serde(with = "senti_domain::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(default = "default_source")]
	pub source: String,
}
impl From<&SentimentRecord> for StoredRecord {
	fn from(record: &SentimentRecord) -> Self {
		let split = SplitProbabilities::split(&record.probabilities);

		Self {
			id: record.id,
			text: record.text.clone(),
			predicted_class: record.predicted_class.clone(),
			confidence: record.confidence,
			positive_prob: split.positive,
			negative_prob: split.negative,
			neutral_prob: split.neutral,
			other_probs: split.other,
			created_at: record.created_at,
			source: record.source.clone(),
		}
	}
}
impl From<StoredRecord> for SentimentRecord {
	fn from(stored: StoredRecord) -> Self {
		let probabilities = SplitProbabilities {
			positive: stored.positive_prob,
			negative: stored.negative_prob,
			neutral: stored.neutral_prob,
			other: stored.other_probs,
		}
		.merge();

		Self {
			id: stored.id,
			text: stored.text,
			predicted_class: stored.predicted_class,
			confidence: stored.confidence,
			probabilities,
			created_at: stored.created_at,
			source: stored.source,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct SentimentRow {
	pub id: i64,
	pub text: String,
	pub predicted_class: String,
	pub confidence: f64,
	pub positive_prob: Option<f64>,
	pub negative_prob: Option<f64>,
	pub neutral_prob: Option<f64>,
	pub other_probs: Json<Probabilities>,
	pub created_at: OffsetDateTime,
	pub source: String,
}
impl From<SentimentRow> for SentimentRecord {
	fn from(row: SentimentRow) -> Self {
		let probabilities = SplitProbabilities {
			positive: row.positive_prob,
			negative: row.negative_prob,
			neutral: row.neutral_prob,
			other: row.other_probs.0,
		}
		.merge();

		Self {
			id: row.id,
			text: row.text,
			predicted_class: row.predicted_class,
			confidence: row.confidence,
			probabilities,
			created_at: row.created_at,
			source: row.source,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct MetaRow {
	pub created_at: OffsetDateTime,
	pub last_updated: OffsetDateTime,
	pub last_id: i64,
}

fn default_source() -> String {
	DEFAULT_SOURCE.to_string()
}
