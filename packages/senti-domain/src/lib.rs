pub mod record;
pub mod stats;
pub mod time_serde;

pub use record::{
	CANONICAL_LABELS, DEFAULT_SOURCE, NewRecord, Probabilities, SentimentRecord, newest_first,
};
pub use stats::{CategoryStat, ChartPoint, compute_chart_series, compute_stats, sentiment_color};
