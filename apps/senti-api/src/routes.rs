use axum::{
	Json, Router,
	extract::{
		Query, State,
		rejection::{JsonRejection, QueryRejection},
	},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use senti_domain::ChartPoint;
use senti_service::{
	ClearResponse, Error as ServiceError, ListResponse, OverviewResponse, SubmitRequest,
	SubmitResponse,
};

use crate::state::AppState;

const SUBMIT_SCALAR_FIELDS: [(&str, fn(&Value) -> bool); 3] = [
	("text", Value::is_string),
	("predicted_class", Value::is_string),
	("confidence", Value::is_number),
];

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/api/health", get(health))
		.route("/api/save-sentiment", post(save_sentiment))
		.route("/api/sentiment-data", get(sentiment_data))
		.route("/api/sentiment-stats", get(sentiment_stats))
		.route("/api/chart-data", get(chart_data))
		.route("/api/clear-data", delete(clear_data))
		.fallback(not_found)
		.with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
	status: &'static str,
	environment: String,
	database: DatabaseHealth,
	#[serde(with = "senti_domain::time_serde")]
	timestamp: OffsetDateTime,
}

#[derive(Debug, Serialize)]
struct DatabaseHealth {
	total_entries: u64,
	database_type: String,
	connection_status: String,
	#[serde(with = "senti_domain::time_serde")]
	last_updated: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
	limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ChartResponse {
	chart_data: Vec<ChartPoint>,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
	let info = state.service.info().await?;

	Ok(Json(HealthResponse {
		status: "ok",
		environment: state.environment.clone(),
		database: DatabaseHealth {
			total_entries: info.total_entries,
			database_type: info.database_type,
			connection_status: info.connection_status.unwrap_or_else(|| "connected".to_string()),
			last_updated: info.last_updated,
		},
		timestamp: OffsetDateTime::now_utc(),
	}))
}

async fn save_sentiment(
	State(state): State<AppState>,
	body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
	let Json(body) = body?;
	let payload = parse_submit(body)?;
	let response = state.service.submit(payload).await?;

	Ok(Json(response))
}

async fn sentiment_data(
	State(state): State<AppState>,
	query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ListResponse>, ApiError> {
	let Query(query) = query.map_err(|rejection| {
		ApiError::invalid(rejection.body_text(), vec!["limit".to_string()])
	})?;
	let response = state.service.list(query.limit).await?;

	Ok(Json(response))
}

async fn sentiment_stats(
	State(state): State<AppState>,
) -> Result<Json<OverviewResponse>, ApiError> {
	let response = state.service.overview(state.recent_entries_limit).await?;

	Ok(Json(response))
}

async fn chart_data(State(state): State<AppState>) -> Result<Json<ChartResponse>, ApiError> {
	let chart_data = state.service.chart().await?;

	Ok(Json(ChartResponse { chart_data }))
}

async fn clear_data(State(state): State<AppState>) -> Result<Json<ClearResponse>, ApiError> {
	let response = state.service.clear().await?;

	Ok(Json(response))
}

/// Type-checks the body field by field so a mistyped value is reported by name, then decodes
/// it. Missing and null fields are left to the service validation.
fn parse_submit(body: Value) -> Result<SubmitRequest, ApiError> {
	let Value::Object(map) = &body else {
		return Err(ApiError::invalid("Request body must be a JSON object.", Vec::new()));
	};
	let mut fields = SUBMIT_SCALAR_FIELDS
		.iter()
		.filter(|(name, accepts)| present(map, name).is_some_and(|value| !accepts(value)))
		.map(|(name, _)| name.to_string())
		.collect::<Vec<_>>();

	match present(map, "all_probabilities") {
		Some(Value::Object(probabilities)) => fields.extend(
			probabilities
				.iter()
				.filter(|(_, value)| !value.is_number())
				.map(|(label, _)| format!("all_probabilities.{label}")),
		),
		Some(_) => fields.push("all_probabilities".to_string()),
		None => {},
	}

	if !fields.is_empty() {
		return Err(ApiError::invalid(
			format!("Fields have the wrong type: {}.", fields.join(", ")),
			fields,
		));
	}

	serde_json::from_value(body).map_err(|err| ApiError::invalid(err.to_string(), Vec::new()))
}

fn present<'a>(map: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
	map.get(name).filter(|value| !value.is_null())
}

async fn not_found() -> ApiError {
	ApiError::new(StatusCode::NOT_FOUND, "not_found", "Endpoint not found.", None)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	record: Option<serde_json::Value>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
	record: Option<serde_json::Value>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self {
			status,
			error_code: error_code.into(),
			message: message.into(),
			fields,
			record: None,
		}
	}

	fn invalid(message: impl Into<String>, fields: Vec<String>) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "invalid_request", message, Some(fields))
	}
}
impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		Self::invalid(rejection.body_text(), Vec::new())
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message, fields } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_request", message, Some(fields)),
			ServiceError::Storage { .. } => Self::new(
				StatusCode::INTERNAL_SERVER_ERROR,
				"persistence_error",
				err.to_string(),
				None,
			),
			ServiceError::Aggregation { ref record, .. } => {
				let record = serde_json::to_value(record.as_ref()).ok();
				let message = err.to_string();

				Self {
					record,
					..Self::new(
						StatusCode::INTERNAL_SERVER_ERROR,
						"aggregation_error",
						message,
						None,
					)
				}
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error_code: self.error_code,
			message: self.message,
			fields: self.fields,
			record: self.record,
		};

		(self.status, Json(body)).into_response()
	}
}
