use crate::infra::{parse_column_map, AppState};
use axum::extract::{Multipart, Query};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use lead_pipeline::error::AppError;
use lead_pipeline::workflows::leads::{
    lead_router, write_leads_csv, BulkResponse, ColumnMap, LeadService,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct IngestParams {
    #[serde(default)]
    pub(crate) drop_invalid: bool,
    #[serde(default)]
    pub(crate) column_map: Option<String>,
    /// `csv` returns the cleaned rows as a download instead of JSON.
    #[serde(default)]
    pub(crate) format: Option<String>,
}

impl IngestParams {
    fn wants_csv(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|format| format.eq_ignore_ascii_case("csv"))
    }
}

pub(crate) fn with_lead_routes(service: Arc<LeadService>) -> Router {
    lead_router(Arc::clone(&service))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/ingest_csv", post(ingest_csv_endpoint))
        .layer(Extension(service))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Accepts a multipart upload with a `file` field holding a CSV export and an
/// optional `column_map` field; the query string may carry the same options.
pub(crate) async fn ingest_csv_endpoint(
    Extension(service): Extension<Arc<LeadService>>,
    Query(params): Query<IngestParams>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut upload = None;
    let wants_csv = params.wants_csv();
    let mut column_map = params.column_map;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(err.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                if !is_csv_upload(&file_name) {
                    return Err(AppError::BadRequest(format!(
                        "upload `{file_name}` must be a .csv file"
                    )));
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::BadRequest(err.to_string()))?;
                upload = Some(bytes);
            }
            Some("column_map") => {
                let text = field
                    .text()
                    .await
                    .map_err(|err| AppError::BadRequest(err.to_string()))?;
                if !text.trim().is_empty() {
                    column_map = Some(text);
                }
            }
            _ => {}
        }
    }

    let upload =
        upload.ok_or_else(|| AppError::BadRequest("missing multipart field `file`".to_string()))?;
    let columns = match column_map.as_deref() {
        Some(raw) => parse_column_map(raw).map_err(AppError::BadRequest)?,
        None => ColumnMap::default(),
    };
    let drop_invalid = params.drop_invalid;

    let outcome = tokio::task::spawn_blocking(move || {
        service.ingest_csv(&upload[..], &columns, drop_invalid)
    })
    .await
    .map_err(|err| AppError::Io(std::io::Error::other(err)))??;

    if wants_csv {
        let mut buffer = Vec::new();
        write_leads_csv(&mut buffer, &outcome.results)?;
        return Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=cleaned.csv"),
            ],
            buffer,
        )
            .into_response());
    }

    Ok(Json(BulkResponse {
        results: outcome.results,
        summary: outcome.summary,
    })
    .into_response())
}

fn is_csv_upload(file_name: &str) -> bool {
    mime_guess::from_path(file_name)
        .iter()
        .any(|mime| mime.essence_str() == "text/csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use lead_pipeline::workflows::leads::RulesStore;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    const BOUNDARY: &str = "lead-boundary";

    fn service() -> Arc<LeadService> {
        Arc::new(LeadService::new(Arc::new(RulesStore::default())))
    }

    fn multipart_body(file_name: &str, csv: &str, column_map: Option<&str>) -> String {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n"
        );
        if let Some(map) = column_map {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"column_map\"\r\n\r\n{map}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn upload(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request")
    }

    async fn read_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    const CSV: &str = "Name,Email,Phone\nAlex Doe,alex@x.com,\nGhost,,\n";

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };

        let response = readiness_endpoint(Extension(state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state
            .readiness
            .store(true, std::sync::atomic::Ordering::Relaxed);
        let response = readiness_endpoint(Extension(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ingest_csv_processes_uploaded_file() {
        let response = with_lead_routes(service())
            .oneshot(upload("/ingest_csv", multipart_body("leads.csv", CSV, None)))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["results"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["summary"]["count_in"], 2);
        assert_eq!(body["summary"]["count_out"], 1);
        assert_eq!(body["results"][1]["drop_reason"], "no_valid_contact");
    }

    #[tokio::test]
    async fn ingest_csv_can_drop_invalid_rows() {
        let response = with_lead_routes(service())
            .oneshot(upload(
                "/ingest_csv?drop_invalid=true",
                multipart_body("leads.csv", CSV, None),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["results"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["summary"]["dropped"], 1);
    }

    #[tokio::test]
    async fn ingest_csv_applies_column_map_field() {
        let csv = "Contact,Work Email\nPat Kim,pat@globex.com\n";
        let response = with_lead_routes(service())
            .oneshot(upload(
                "/ingest_csv",
                multipart_body("leads.csv", csv, Some(r#"{"name":"Contact","email":"Work Email"}"#)),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["results"][0]["first_name"], "Pat");
        assert_eq!(body["results"][0]["email_valid"], true);
    }

    #[tokio::test]
    async fn ingest_csv_can_return_cleaned_csv() {
        let response = with_lead_routes(service())
            .oneshot(upload(
                "/ingest_csv?drop_invalid=true&format=csv",
                multipart_body("leads.csv", CSV, None),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("text/csv")
        );
        assert!(response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("cleaned.csv")));

        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let text = String::from_utf8(bytes.to_vec()).expect("utf8");
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("alex@x.com"));
        assert!(!text.contains("Ghost"));
    }

    #[tokio::test]
    async fn ingest_csv_rejects_non_csv_uploads() {
        let response = with_lead_routes(service())
            .oneshot(upload("/ingest_csv", multipart_body("leads.xlsx", CSV, None)))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert!(body["error"]
            .as_str()
            .is_some_and(|message| message.contains(".csv")));
    }

    #[tokio::test]
    async fn ingest_csv_rejects_malformed_column_map() {
        let response = with_lead_routes(service())
            .oneshot(upload(
                "/ingest_csv?column_map=%7Bbroken",
                multipart_body("leads.csv", CSV, None),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn ingest_csv_respects_batch_limit() {
        let service = Arc::new(
            LeadService::new(Arc::new(RulesStore::default())).with_max_batch_size(1),
        );
        let response = with_lead_routes(service)
            .oneshot(upload("/ingest_csv", multipart_body("leads.csv", CSV, None)))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
