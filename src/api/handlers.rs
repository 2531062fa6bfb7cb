use crate::analytics::{AnalyticsError, DerivedMetrics};
use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::metrics::{
    gather_metrics, record_distribution, AGGREGATIONS_TOTAL, AGGREGATION_DURATION_SECONDS,
    LEADS_CREATED_TOTAL, LEADS_DELETED_TOTAL, LEAD_UPDATES_TOTAL,
};
use crate::models::*;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Admin login
///
/// Failures answer `{success: false, message}` so the dashboard can show the
/// message inline: 401 on a wrong password, 500 when no password is set.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> (StatusCode, Json<LoginResponse>) {
    match state.auth.verify(&request.password) {
        Ok(()) => (
            StatusCode::OK,
            Json(LoginResponse {
                success: true,
                message: None,
            }),
        ),
        Err(AppError::Authentication(message)) => {
            LoginResponse::failure(StatusCode::UNAUTHORIZED, message)
        }
        Err(AppError::Configuration(message)) => {
            tracing::error!(message = %message, "Admin login unavailable");
            LoginResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
        Err(e) => LoginResponse::failure(e.status_code(), e.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LoginResponse {
    fn failure(status: StatusCode, message: String) -> (StatusCode, Json<LoginResponse>) {
        (
            status,
            Json(LoginResponse {
                success: false,
                message: Some(message),
            }),
        )
    }
}

/// List every lead, newest first
pub async fn list_leads(State(state): State<AppState>) -> Result<Json<Vec<LeadRecord>>> {
    let leads = state.store.list_leads().await?;
    Ok(Json(leads))
}

/// Capture a lead from the public contact form
pub async fn create_lead(
    State(state): State<AppState>,
    Json(request): Json<NewLead>,
) -> Result<(StatusCode, Json<CreateLeadResponse>)> {
    request.validate()?;

    let lead = state.store.create_lead(request).await?;
    LEADS_CREATED_TOTAL.inc();

    tracing::info!(lead_id = lead.id, "Lead captured");

    Ok((
        StatusCode::CREATED,
        Json(CreateLeadResponse {
            message: "Lead created successfully".to_string(),
            id: lead.id,
        }),
    ))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateLeadResponse {
    pub message: String,
    pub id: LeadId,
}

/// Replace a lead's status and notes
pub async fn update_lead(
    State(state): State<AppState>,
    Path(id): Path<LeadId>,
    Json(update): Json<LeadUpdate>,
) -> Result<Json<MessageResponse>> {
    let status = update.status;
    state.store.update_lead(id, update).await?;
    LEAD_UPDATES_TOTAL
        .with_label_values(&[status.as_ref()])
        .inc();

    tracing::info!(lead_id = id, status = %status, "Lead updated");

    Ok(Json(MessageResponse::new("Lead updated successfully")))
}

/// Remove a lead
pub async fn delete_lead(
    State(state): State<AppState>,
    Path(id): Path<LeadId>,
) -> Result<Json<MessageResponse>> {
    state.store.delete_lead(id).await?;
    LEADS_DELETED_TOTAL.inc();

    tracing::info!(lead_id = id, "Lead deleted");

    Ok(Json(MessageResponse::new("Lead deleted successfully")))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Dashboard metrics over a fresh snapshot of the store
pub async fn lead_metrics(State(state): State<AppState>) -> Result<Json<DerivedMetrics>> {
    let snapshot = state.store.list_leads().await?;

    let timer = AGGREGATION_DURATION_SECONDS.start_timer();
    let result = state.engine.aggregate(&snapshot);
    timer.observe_duration();

    match result {
        Ok(derived) => {
            AGGREGATIONS_TOTAL.with_label_values(&["success"]).inc();
            record_distribution(&derived);
            Ok(Json(derived))
        }
        Err(e) => {
            let outcome = match e {
                AnalyticsError::DataIntegrity { .. } => "data_integrity",
                _ => "error",
            };
            AGGREGATIONS_TOTAL.with_label_values(&[outcome]).inc();
            Err(e.into())
        }
    }
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics() -> (StatusCode, String) {
    (StatusCode::OK, gather_metrics())
}
