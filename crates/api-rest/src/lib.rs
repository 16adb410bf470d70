//! # API REST
//!
//! REST API for the triage engine.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for request/response types. The engine itself is pure; handlers supply
//! `now` from the request or, when omitted, from the server clock.

#![warn(rust_2018_idioms)]

use api_shared::{
    DecisionRes, ErrorRes, EvaluateReq, HealthRes, HealthService, SweepRes, ThresholdsRes,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use triage_core::{
    sweep_store, CancellationToken, ErrorDisposition, SubmissionRecord, SubmissionStore,
    TriageEngine, TriageError,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

type ApiError = (StatusCode, Json<ErrorRes>);

/// Shared state for the REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: TriageEngine,
    pub store: Arc<dyn SubmissionStore>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, thresholds, evaluate_submission, list_decisions, get_decision),
    components(schemas(
        api_shared::HealthRes,
        api_shared::ThresholdsRes,
        api_shared::TierThresholdRes,
        api_shared::EvaluateReq,
        api_shared::SubmissionReq,
        api_shared::DecisionRes,
        api_shared::LabelsRes,
        api_shared::LabelRes,
        api_shared::ComplianceRes,
        api_shared::CountdownRes,
        api_shared::EscalationRes,
        api_shared::SweepRes,
        api_shared::SweepFailureRes,
        api_shared::ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI mounted at `/swagger-ui`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/thresholds", get(thresholds))
        .route("/submissions/evaluate", post(evaluate_submission))
        .route("/submissions/decisions", get(list_decisions))
        .route("/submissions/:id/decision", get(get_decision))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Query string accepted by the read endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct NowQuery {
    pub now: Option<String>,
}

fn error(status: StatusCode, kind: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorRes {
            kind: kind.to_string(),
            message: message.into(),
        }),
    )
}

/// Maps an engine error to a response: record-level problems are the caller's data, anything
/// else is ours.
fn triage_error(err: &TriageError) -> ApiError {
    let status = match err.disposition() {
        ErrorDisposition::SkipRecord => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorDisposition::AbortSweep => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err.into()))
}

fn parse_now(raw: Option<&str>) -> Result<DateTime<Utc>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Utc::now()),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| {
                error(
                    StatusCode::BAD_REQUEST,
                    "invalid_now",
                    format!("now must be an RFC 3339 timestamp: {e}"),
                )
            }),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/thresholds",
    responses(
        (status = 200, description = "SLA thresholds per urgency tier", body = ThresholdsRes)
    )
)]
#[axum::debug_handler]
async fn thresholds(State(state): State<AppState>) -> Json<ThresholdsRes> {
    Json(ThresholdsRes::from(state.engine.thresholds()))
}

#[utoipa::path(
    post,
    path = "/submissions/evaluate",
    request_body = EvaluateReq,
    responses(
        (status = 200, description = "Triage decision", body = DecisionRes),
        (status = 400, description = "Malformed evaluation instant", body = ErrorRes),
        (status = 422, description = "Submission cannot be triaged", body = ErrorRes)
    )
)]
/// Evaluate a submission supplied in the request body.
///
/// Nothing is read from or written to the store.
#[axum::debug_handler]
async fn evaluate_submission(
    State(state): State<AppState>,
    Json(req): Json<EvaluateReq>,
) -> Result<Json<DecisionRes>, ApiError> {
    let now = parse_now(req.now.as_deref())?;
    let record = SubmissionRecord::from(req.submission);

    match state.engine.compose_record(&record, now) {
        Ok(decision) => Ok(Json(DecisionRes::from(&decision))),
        Err(e) => {
            tracing::warn!(submission_id = %record.id, kind = e.kind(), "evaluate failed: {e}");
            Err(triage_error(&e))
        }
    }
}

#[utoipa::path(
    get,
    path = "/submissions/decisions",
    params(
        ("now" = Option<String>, Query, description = "RFC 3339 evaluation instant; defaults to the server clock")
    ),
    responses(
        (status = 200, description = "Sweep over every stored submission", body = SweepRes),
        (status = 500, description = "Store could not be read", body = ErrorRes)
    )
)]
/// Re-evaluate every submission in the store.
///
/// Bad records are reported in `failures` rather than failing the request.
#[axum::debug_handler]
async fn list_decisions(
    State(state): State<AppState>,
    Query(query): Query<NowQuery>,
) -> Result<Json<SweepRes>, ApiError> {
    let now = parse_now(query.now.as_deref())?;

    let AppState { engine, store } = state;
    let report = tokio::task::spawn_blocking(move || {
        sweep_store(&engine, store.as_ref(), now, &CancellationToken::new())
    })
    .await
    .map_err(|e| error(StatusCode::INTERNAL_SERVER_ERROR, "internal", e.to_string()))?;

    match report {
        Ok(report) => Ok(Json(SweepRes::from(&report))),
        Err(e) => {
            tracing::error!(kind = e.kind(), "sweep failed: {e}");
            Err(triage_error(&e))
        }
    }
}

#[utoipa::path(
    get,
    path = "/submissions/{id}/decision",
    params(
        ("id" = String, Path, description = "Submission id"),
        ("now" = Option<String>, Query, description = "RFC 3339 evaluation instant; defaults to the server clock")
    ),
    responses(
        (status = 200, description = "Triage decision", body = DecisionRes),
        (status = 404, description = "Submission not found", body = ErrorRes),
        (status = 422, description = "Submission cannot be triaged", body = ErrorRes)
    )
)]
/// Evaluate a single stored submission.
///
/// A stored record that cannot be decoded answers 422, not 404.
#[axum::debug_handler]
async fn get_decision(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<NowQuery>,
) -> Result<Json<DecisionRes>, ApiError> {
    let now = parse_now(query.now.as_deref())?;

    let store = state.store.clone();
    let lookup_id = id.clone();
    let record = tokio::task::spawn_blocking(move || store.get(&lookup_id))
        .await
        .map_err(|e| error(StatusCode::INTERNAL_SERVER_ERROR, "internal", e.to_string()))?
        .map_err(|e| {
            tracing::warn!(submission_id = %id, kind = e.kind(), "lookup failed: {e}");
            triage_error(&e)
        })?
        .ok_or_else(|| {
            error(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("submission '{id}' not found"),
            )
        })?;

    state
        .engine
        .compose_record(&record, now)
        .map(|decision| Json(DecisionRes::from(&decision)))
        .map_err(|e| {
            tracing::warn!(submission_id = %id, kind = e.kind(), "decision failed: {e}");
            triage_error(&e)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use triage_core::{InMemoryStore, JsonDirStore};

    fn stored(id: &str, urgency: &str, processing: &str) -> SubmissionRecord {
        SubmissionRecord {
            id: id.into(),
            urgency_level: urgency.into(),
            urgency_flag: None,
            processing_status: processing.into(),
            review_ownership: "nurse_review".into(),
            clinical_action_state: "pending".into(),
            medication_status: None,
            submitted_at: Some("2026-03-02T09:00:00Z".into()),
            last_updated_at: None,
            assigned_to: None,
            estimated_completion_time: None,
        }
    }

    fn app() -> Router {
        router(AppState {
            engine: TriageEngine::default(),
            store: Arc::new(InMemoryStore::new(vec![
                stored("alert-1", "emergency", "received"),
                stored("wi-2", "routine", "resolved"),
                stored("bad-3", "critical", "received"),
            ])),
        })
    }

    async fn send(req: Request<Body>) -> (StatusCode, serde_json::Value) {
        send_to(app(), req).await
    }

    async fn send_to(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app.oneshot(req).await.expect("router is infallible");
        let status = res.status();
        let bytes = res.into_body().collect().await.expect("body").to_bytes();
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_alive() {
        let (status, body) = send(get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn thresholds_lists_four_tiers() {
        let (status, body) = send(get_req("/thresholds")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tiers"].as_array().unwrap().len(), 4);
        assert_eq!(body["tiers"][0]["breachOffsetMinutes"], 15);
    }

    #[tokio::test]
    async fn evaluate_returns_decision() {
        let payload = serde_json::json!({
            "submission": {
                "id": "msg-1",
                "urgencyLevel": "emergency",
                "processingStatus": "in_review",
                "reviewOwnership": "md_review",
                "clinicalActionState": "pending",
                "submittedAt": "2026-03-02T09:00:00Z",
                "lastUpdatedAt": "2026-03-02T09:00:00Z"
            },
            "now": "2026-03-02T09:20:00Z"
        });
        let req = Request::builder()
            .method("POST")
            .uri("/submissions/evaluate")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();

        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["compliance"]["color"], "RED");
        assert_eq!(body["escalation"]["requires"], true);
        assert_eq!(
            body["escalation"]["escalateTo"],
            serde_json::json!(["practice_manager", "md"])
        );
    }

    #[tokio::test]
    async fn evaluate_unknown_status_is_unprocessable() {
        let payload = serde_json::json!({
            "submission": {
                "id": "msg-2",
                "urgencyLevel": "urgent",
                "processingStatus": "archived",
                "reviewOwnership": "md_review",
                "clinicalActionState": "pending",
                "submittedAt": "2026-03-02T09:00:00Z"
            }
        });
        let req = Request::builder()
            .method("POST")
            .uri("/submissions/evaluate")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();

        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "config_not_found");
    }

    #[tokio::test]
    async fn decisions_sweeps_store_and_reports_failures() {
        let (status, body) =
            send(get_req("/submissions/decisions?now=2026-03-02T09:30:00Z")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["decisions"].as_array().unwrap().len(), 2);
        assert_eq!(body["failures"][0]["submissionId"], "bad-3");
        assert_eq!(body["failures"][0]["error"]["kind"], "unknown_urgency_tier");
        assert_eq!(body["notEvaluated"], 0);
    }

    #[tokio::test]
    async fn single_decision_and_not_found() {
        let (status, body) =
            send(get_req("/submissions/alert-1/decision?now=2026-03-02T09:06:00Z")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["compliance"]["color"], "YELLOW");
        assert_eq!(body["compliance"]["nextThreshold"], "2026-03-02T09:15:00Z");

        let (status, body) = send(get_req("/submissions/nope/decision")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");
    }

    #[tokio::test]
    async fn bad_now_is_rejected() {
        let (status, body) = send(get_req("/submissions/decisions?now=soon")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_now");
    }

    #[tokio::test]
    async fn undecodable_stored_record_is_unprocessable_not_missing() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("alert-1.json"),
            serde_json::to_string(&stored("alert-1", "emergency", "received")).unwrap(),
        )
        .unwrap();
        std::fs::write(
            temp.path().join("bad-7.json"),
            r#"{"id": "bad-7", "urgencyLevel": "urgent", "processingStatus": "received",
                "clinicalActionState": "pending"}"#,
        )
        .unwrap();
        let app = router(AppState {
            engine: TriageEngine::default(),
            store: Arc::new(JsonDirStore::new(temp.path())),
        });

        let (status, body) = send_to(
            app.clone(),
            get_req("/submissions/bad-7/decision?now=2026-03-02T09:06:00Z"),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "malformed_submission");

        let (status, body) = send_to(
            app,
            get_req("/submissions/decisions?now=2026-03-02T09:06:00Z"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["decisions"].as_array().unwrap().len(), 1);
        assert_eq!(body["failures"][0]["submissionId"], "bad-7");
        assert_eq!(body["failures"][0]["error"]["kind"], "malformed_submission");
    }
}
