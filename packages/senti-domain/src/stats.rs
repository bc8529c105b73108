use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::record::{NEGATIVE, NEUTRAL, POSITIVE, SentimentRecord};

const POSITIVE_COLOR: &str = "#22c55e";
const NEGATIVE_COLOR: &str = "#ef4444";
const NEUTRAL_COLOR: &str = "#6b7280";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStat {
	pub predicted_class: String,
	pub count: u64,
	pub avg_confidence: f64,
	pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
	pub label: String,
	pub value_percentage: f64,
	pub count: u64,
	pub avg_confidence: f64,
	pub color: String,
}

struct Group<'a> {
	class: &'a str,
	count: u64,
	confidence_sum: f64,
}

/// Per-class counts, mean confidence and share of the whole record set.
///
/// Input order does not matter. Groups follow the order in which their class first appears
/// by ascending id, which is insertion order; the final sort by count is stable, so that
/// order breaks ties.
pub fn compute_stats(records: &[SentimentRecord]) -> Vec<CategoryStat> {
	if records.is_empty() {
		return Vec::new();
	}

	let mut by_id = records.iter().collect::<Vec<_>>();

	by_id.sort_by_key(|record| record.id);

	let mut index: HashMap<&str, usize> = HashMap::new();
	let mut groups: Vec<Group<'_>> = Vec::new();

	for record in by_id {
		let class = record.predicted_class.as_str();
		let slot = *index.entry(class).or_insert_with(|| {
			groups.push(Group { class, count: 0, confidence_sum: 0.0 });

			groups.len() - 1
		});
		let group = &mut groups[slot];

		group.count += 1;
		group.confidence_sum += record.confidence;
	}

	let total = records.len() as f64;
	let mut stats = groups
		.into_iter()
		.map(|group| CategoryStat {
			predicted_class: group.class.to_string(),
			count: group.count,
			avg_confidence: round_to(group.confidence_sum / group.count as f64, 4),
			percentage: round_to(group.count as f64 / total * 100.0, 2),
		})
		.collect::<Vec<_>>();

	stats.sort_by(|a, b| b.count.cmp(&a.count));

	stats
}

/// Reshapes stats for chart rendering, preserving their order.
pub fn compute_chart_series(stats: &[CategoryStat]) -> Vec<ChartPoint> {
	stats
		.iter()
		.map(|stat| ChartPoint {
			label: capitalize(&stat.predicted_class),
			value_percentage: stat.percentage,
			count: stat.count,
			avg_confidence: stat.avg_confidence,
			color: sentiment_color(&stat.predicted_class).to_string(),
		})
		.collect()
}

/// Palette lookup. Unknown labels share the neutral color.
pub fn sentiment_color(class: &str) -> &'static str {
	match class {
		POSITIVE => POSITIVE_COLOR,
		NEGATIVE => NEGATIVE_COLOR,
		NEUTRAL => NEUTRAL_COLOR,
		_ => NEUTRAL_COLOR,
	}
}

fn capitalize(label: &str) -> String {
	let mut chars = label.chars();

	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

fn round_to(value: f64, decimals: i32) -> f64 {
	let factor = 10_f64.powi(decimals);

	(value * factor).round() / factor
}
