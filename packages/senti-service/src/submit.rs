use serde::{Deserialize, Serialize};

use senti_domain::{
	CategoryStat, ChartPoint, NewRecord, Probabilities, SentimentRecord, compute_chart_series,
	compute_stats,
};

use crate::{Error, Result, SentimentService};

/// Classifier output as forwarded by the frontend. Every field is required.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
	pub text: Option<String>,
	pub predicted_class: Option<String>,
	pub confidence: Option<f64>,
	pub all_probabilities: Option<Probabilities>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
	pub record: SentimentRecord,
	pub stats: Vec<CategoryStat>,
	pub chart_data: Vec<ChartPoint>,
}

impl SentimentService {
	/// Validates, persists, and returns the record with stats computed after the write.
	pub async fn submit(&self, req: SubmitRequest) -> Result<SubmitResponse> {
		let new_record = validate_submit(req)?;
		let _gate = self.write_gate.lock().await;
		let record =
			self.store.insert(new_record).await.map_err(|err| Error::storage("insert", err))?;
		let records = match self.store.list_all().await {
			Ok(records) => records,
			Err(err) => {
				tracing::error!(id = record.id, error = %err, "Aggregation failed after insert.");

				return Err(Error::Aggregation {
					record: Box::new(record),
					message: err.to_string(),
				});
			},
		};
		let stats = compute_stats(&records);
		let chart_data = compute_chart_series(&stats);

		Ok(SubmitResponse { record, stats, chart_data })
	}
}

fn validate_submit(req: SubmitRequest) -> Result<NewRecord> {
	let text = req.text.filter(|text| !text.trim().is_empty());
	let predicted_class = req.predicted_class.filter(|class| !class.trim().is_empty());
	let probabilities = req.all_probabilities.filter(|probabilities| !probabilities.is_empty());
	let mut missing = Vec::new();

	if text.is_none() {
		missing.push("text");
	}
	if predicted_class.is_none() {
		missing.push("predicted_class");
	}
	if req.confidence.is_none() {
		missing.push("confidence");
	}
	if probabilities.is_none() {
		missing.push("all_probabilities");
	}

	let (Some(text), Some(predicted_class), Some(confidence), Some(probabilities)) =
		(text, predicted_class, req.confidence, probabilities)
	else {
		return Err(Error::InvalidRequest {
			message: format!("Missing required fields: {}.", missing.join(", ")),
			fields: missing.into_iter().map(str::to_string).collect(),
		});
	};

	if !is_probability(confidence) {
		return Err(Error::InvalidRequest {
			message: "confidence must be a number between 0 and 1.".to_string(),
			fields: vec!["confidence".to_string()],
		});
	}

	let out_of_range = probabilities
		.iter()
		.filter(|(label, value)| label.trim().is_empty() || !is_probability(**value))
		.map(|(label, _)| format!("all_probabilities.{label}"))
		.collect::<Vec<_>>();

	if !out_of_range.is_empty() {
		return Err(Error::InvalidRequest {
			message: "all_probabilities must map non-empty labels to numbers between 0 and 1."
				.to_string(),
			fields: out_of_range,
		});
	}

	Ok(NewRecord::new(text, predicted_class, confidence, probabilities))
}

fn is_probability(value: f64) -> bool {
	value.is_finite() && (0.0..=1.0).contains(&value)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn full_request() -> SubmitRequest {
		SubmitRequest {
			text: Some("I love it".to_string()),
			predicted_class: Some(" positive ".to_string()),
			confidence: Some(0.91),
			all_probabilities: Some(Probabilities::from([
				("positive".to_string(), 0.91),
				("negative".to_string(), 0.04),
				("neutral".to_string(), 0.05),
			])),
		}
	}

	fn invalid_fields(req: SubmitRequest) -> Vec<String> {
		match validate_submit(req) {
			Err(Error::InvalidRequest { fields, .. }) => fields,
			other => panic!("Expected invalid request, got {other:?}."),
		}
	}

	#[test]
	fn accepts_complete_request() {
		let record = validate_submit(full_request()).expect("Expected valid request.");

		assert_eq!(record.predicted_class, " positive ");
		assert_eq!(record.source, "web_analyzer");
		assert_eq!(record.probabilities.len(), 3);
	}

	#[test]
	fn lists_every_missing_field() {
		let fields = invalid_fields(SubmitRequest {
			text: Some("   ".to_string()),
			confidence: Some(0.5),
			..SubmitRequest::default()
		});

		assert_eq!(fields, vec!["text", "predicted_class", "all_probabilities"]);
	}

	#[test]
	fn zero_confidence_is_present() {
		let mut req = full_request();

		req.confidence = Some(0.0);

		assert!(validate_submit(req).is_ok());
	}

	#[test]
	fn empty_probability_map_counts_as_missing() {
		let mut req = full_request();

		req.all_probabilities = Some(Probabilities::new());

		assert_eq!(invalid_fields(req), vec!["all_probabilities"]);
	}

	#[test]
	fn rejects_out_of_range_values() {
		let mut req = full_request();

		req.confidence = Some(1.5);

		assert_eq!(invalid_fields(req), vec!["confidence"]);

		let mut req = full_request();

		if let Some(probabilities) = req.all_probabilities.as_mut() {
			probabilities.insert("negative".to_string(), f64::NAN);
		}

		assert_eq!(invalid_fields(req), vec!["all_probabilities.negative"]);
	}
}
