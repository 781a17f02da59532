#![deny(unsafe_code)]

pub mod config;

pub use config::ServiceSettings;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use creditbank_adapters::ConfigBackendClient;
use creditbank_core::{BoundsProvider, Credit, GroupStore, QuoteError, QuoteRequest, QuoteService};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::warn;

#[derive(Clone)]
pub struct ServiceState {
    pub quotes: Arc<QuoteService>,
}

impl ServiceState {
    pub fn new(
        settings: &ServiceSettings,
        bounds: Arc<dyn BoundsProvider>,
        groups: Arc<dyn GroupStore>,
    ) -> Self {
        Self {
            quotes: Arc::new(QuoteService::new(&settings.local_bank(), bounds, groups)),
        }
    }

    /// Wires the quote pipeline to the configuration backend named in `settings`.
    pub fn bootstrap(settings: &ServiceSettings) -> Result<Self, QuoteError> {
        let backend = Arc::new(ConfigBackendClient::new(settings.config_backend.clone())?);
        Ok(Self::new(settings, backend.clone(), backend))
    }
}

pub fn build_router(state: ServiceState, api_version: &str) -> Router {
    let prefix = format!("/{}", api_version.trim_matches('/'));
    Router::new()
        .route(&format!("{prefix}/health"), get(health))
        .route(&format!("{prefix}/credit"), get(credit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] QuoteError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            QuoteError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            QuoteError::NotFound(_) => StatusCode::NOT_FOUND,
            QuoteError::InvalidState(_) | QuoteError::RemoteRejected { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            QuoteError::RemoteUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            QuoteError::Decoding(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Error payload returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub reasons: Vec<String>,
    /// Upper snake case status name, e.g. `BAD_REQUEST`
    pub status: String,
    pub code: u16,
    pub date_time: DateTime<Utc>,
}

impl ErrorBody {
    fn new(status: StatusCode, reasons: Vec<String>) -> Self {
        let name = status
            .canonical_reason()
            .unwrap_or("UNKNOWN")
            .to_ascii_uppercase()
            .replace([' ', '-'], "_");
        Self {
            reasons,
            status: name,
            code: status.as_u16(),
            date_time: Utc::now(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(status = status.as_u16(), error = %self.0, "Quote request failed");
        (status, Json(ErrorBody::new(status, self.0.reasons()))).into_response()
    }
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    bank: String,
}

async fn health(State(state): State<ServiceState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "creditbank-service",
        bank: state.quotes.bank_name().to_string(),
    })
}

/// Builds the raw quote request from query pairs; a repeated key keeps its first value.
pub fn quote_request<I>(pairs: I) -> QuoteRequest
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut request = QuoteRequest::default();
    for (key, value) in pairs {
        let slot = match key.as_str() {
            "amountInEuros" => &mut request.amount_in_euros,
            "termInMonths" => &mut request.term_in_months,
            "ratingLevel" => &mut request.rating_level,
            "delayInMilliseconds" => &mut request.delay_in_milliseconds,
            "username" => &mut request.username,
            "password" => &mut request.password,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }
    request
}

async fn credit(
    State(state): State<ServiceState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Credit>, ApiError> {
    let request = quote_request(pairs);
    Ok(Json(state.quotes.quote(&request).await?))
}
