// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HTTP surface of the gateway.
//!
//! Catalog reads are plain JSON documents. Advisory calls answer with an
//! [`AdvisoryOutcome`] envelope tagged by `status`, so clients can branch on
//! success or failure without inspecting the HTTP status.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::application::advisory::AdvisoryGateway;
use crate::application::catalog::CatalogService;
use crate::domain::advisory::{
    AdvisoryError, AnomalyAdvisoryRequest, FieldIssue, ViolationAdvisoryRequest,
};
use crate::domain::agent::AgentId;
use crate::domain::repository::RepositoryError;

pub struct AppState {
    pub catalog: CatalogService,
    /// `None` when no LLM provider could be configured
    pub advisories: Option<Arc<AdvisoryGateway>>,
}

pub fn app(catalog: CatalogService, advisories: Option<Arc<AdvisoryGateway>>) -> Router {
    let state = Arc::new(AppState {
        catalog,
        advisories,
    });

    Router::new()
        .route("/health", get(health))
        .route("/api/overview", get(overview))
        .route("/api/agents", get(list_agents))
        .route("/api/agents/{id}", get(agent_detail))
        .route("/api/agents/{id}/shadow-drift", get(shadow_drift))
        .route("/api/policies", get(list_policies))
        .route("/api/risk/platform", get(platform_risk))
        .route("/api/advisories/anomaly", post(anomaly_advisory))
        .route("/api/advisories/violation", post(violation_advisory))
        .with_state(state)
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Repository(RepositoryError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ============================================================================
// Advisory envelope
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdvisoryOutcome<T> {
    Success {
        data: T,
    },
    Failure {
        kind: &'static str,
        message: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        issues: Vec<FieldIssue>,
    },
}

impl<T> AdvisoryOutcome<T> {
    fn unavailable() -> Self {
        AdvisoryOutcome::Failure {
            kind: "unavailable",
            message: "advisory service is not configured".to_string(),
            issues: Vec::new(),
        }
    }

    fn malformed(rejection: JsonRejection) -> Self {
        AdvisoryOutcome::Failure {
            kind: "validation",
            message: rejection.body_text(),
            issues: Vec::new(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AdvisoryOutcome::Success { .. } => StatusCode::OK,
            AdvisoryOutcome::Failure { kind: "validation", .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AdvisoryOutcome::Failure { kind: "unavailable", .. } => StatusCode::SERVICE_UNAVAILABLE,
            AdvisoryOutcome::Failure { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl<T> From<Result<T, AdvisoryError>> for AdvisoryOutcome<T> {
    fn from(result: Result<T, AdvisoryError>) -> Self {
        match result {
            Ok(data) => AdvisoryOutcome::Success { data },
            Err(e) => AdvisoryOutcome::Failure {
                kind: e.kind_label(),
                message: e.to_string(),
                issues: e.issues().to_vec(),
            },
        }
    }
}

impl<T: Serialize> IntoResponse for AdvisoryOutcome<T> {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn overview(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.catalog.overview().await?))
}

async fn list_agents(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.catalog.list_agents().await?))
}

async fn agent_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = AgentId::new(id);
    state
        .catalog
        .agent_detail(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("agent '{}' not found", id)))
}

async fn shadow_drift(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = AgentId::new(id);
    state
        .catalog
        .shadow_drift(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("agent '{}' has no shadow deployment", id)))
}

async fn list_policies(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.catalog.list_policies().await?))
}

async fn platform_risk(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.catalog.platform_risk_trend().await?))
}

async fn anomaly_advisory(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnomalyAdvisoryRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return AdvisoryOutcome::<()>::malformed(rejection).into_response(),
    };
    let Some(gateway) = state.advisories.as_ref() else {
        return AdvisoryOutcome::<()>::unavailable().into_response();
    };

    AdvisoryOutcome::from(gateway.detect_anomalies(&request).await).into_response()
}

async fn violation_advisory(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ViolationAdvisoryRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return AdvisoryOutcome::<()>::malformed(rejection).into_response(),
    };
    let Some(gateway) = state.advisories.as_ref() else {
        return AdvisoryOutcome::<()>::unavailable().into_response();
    };

    AdvisoryOutcome::from(gateway.analyze_violation(&request).await).into_response()
}
