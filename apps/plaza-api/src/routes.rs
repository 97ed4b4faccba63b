use axum::{
	Json, Router,
	extract::{Query, State},
	http::{HeaderValue, StatusCode},
	response::{IntoResponse, Response},
	routing::get,
};
use serde::Serialize;

use plaza_service::{Error as ServiceError, FeedParams};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/feed", get(feed))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn feed(
	State(state): State<AppState>,
	Query(params): Query<FeedParams>,
) -> Result<Response, ApiError> {
	let feed = state.service.feed(params).await?;
	let cache_key = feed.cache_key.clone();
	let mut response = Json(feed).into_response();

	if let Ok(value) = HeaderValue::from_str(&cache_key) {
		response.headers_mut().insert("x-cache-key", value);
	}

	Ok(response)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: &str, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.to_string(), message: message.into() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_request", message),
			ServiceError::UnknownTaxonomy { message } =>
				Self::new(StatusCode::BAD_REQUEST, "unknown_taxonomy", message),
			ServiceError::NotFound { message } =>
				Self::new(StatusCode::NOT_FOUND, "not_found", message),
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "storage failure");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "Storage failure.")
			},
			ServiceError::Unavailable => Self::new(
				StatusCode::SERVICE_UNAVAILABLE,
				"unavailable",
				"Every content source failed; try again shortly.",
			),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
