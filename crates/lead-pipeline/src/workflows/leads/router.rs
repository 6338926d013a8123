use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::batch::BatchSummary;
use super::domain::{RawLead, ScoredLead};
use super::export::write_salesforce_csv;
use super::scoring::RulesError;
use super::service::{LeadService, LeadServiceError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkRequest {
    #[serde(default)]
    pub leads: Vec<RawLead>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkResponse {
    pub results: Vec<ScoredLead>,
    pub summary: BatchSummary,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SalesforceQuery {
    #[serde(default)]
    format: Option<String>,
}

/// Router exposing enrichment, batch scoring, rules management and the
/// Salesforce mapping.
pub fn lead_router(service: Arc<LeadService>) -> Router {
    Router::new()
        .route("/enrich", post(enrich_handler))
        .route("/bulk", post(bulk_handler))
        .route("/config/rules", get(get_rules_handler).put(put_rules_handler))
        .route("/salesforce/map", post(salesforce_handler))
        .with_state(service)
}

pub(crate) async fn enrich_handler(
    State(service): State<Arc<LeadService>>,
    axum::Json(lead): axum::Json<RawLead>,
) -> Response {
    let scored = service.enrich(lead);
    (StatusCode::OK, axum::Json(scored)).into_response()
}

pub(crate) async fn bulk_handler(
    State(service): State<Arc<LeadService>>,
    axum::Json(request): axum::Json<BulkRequest>,
) -> Response {
    let task = tokio::task::spawn_blocking(move || service.bulk(request.leads)).await;

    match task {
        Ok(Ok(outcome)) => {
            let body = BulkResponse {
                results: outcome.results,
                summary: outcome.summary,
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Ok(Err(error)) => error_response(error),
        Err(join_error) => {
            let payload = json!({ "error": join_error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn get_rules_handler(State(service): State<Arc<LeadService>>) -> Response {
    let rules = service.rules();
    (StatusCode::OK, axum::Json(rules.as_ref())).into_response()
}

pub(crate) async fn put_rules_handler(
    State(service): State<Arc<LeadService>>,
    axum::Json(value): axum::Json<serde_json::Value>,
) -> Response {
    match service.replace_rules(value) {
        Ok(rules) => (StatusCode::OK, axum::Json(rules.as_ref())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn salesforce_handler(
    State(service): State<Arc<LeadService>>,
    Query(query): Query<SalesforceQuery>,
    axum::Json(request): axum::Json<BulkRequest>,
) -> Response {
    let rows = match service.salesforce_rows(request.leads) {
        Ok(rows) => rows,
        Err(error) => return error_response(error),
    };

    let wants_csv = query
        .format
        .as_deref()
        .is_some_and(|format| format.eq_ignore_ascii_case("csv"));
    if !wants_csv {
        return (StatusCode::OK, axum::Json(rows)).into_response();
    }

    let mut buffer = Vec::new();
    if let Err(error) = write_salesforce_csv(&mut buffer, &rows) {
        let payload = json!({ "error": error.to_string() });
        return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response();
    }

    let disposition = format!(
        "attachment; filename=salesforce_{}.csv",
        chrono::Utc::now().timestamp()
    );
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    )
        .into_response()
}

/// Maps service failures onto HTTP statuses with a JSON `error` body.
pub fn error_response(error: LeadServiceError) -> Response {
    let status = match &error {
        LeadServiceError::Rules(RulesError::Io { .. } | RulesError::Encode(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        LeadServiceError::Rules(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LeadServiceError::BatchTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        LeadServiceError::Import(_) => StatusCode::BAD_REQUEST,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
