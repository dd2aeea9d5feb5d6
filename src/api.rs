//! HTTP boundary: routing, multipart extraction, and the mapping from the
//! error taxonomy to status codes. All orchestration lives in
//! [`ProjectionEngine`]; the handlers only translate between HTTP and the
//! core types.

use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use log::{error, warn};
use serde::Deserialize;
use serde_json::json;

use crate::engine::ProjectionEngine;
use crate::error::{ProjectionError, Result};
use crate::goal::{calculate_goal_requirements, GoalRequirements};
use crate::request::{CsvDocument, GoalParams, ProjectionRequest, DEFAULT_GOAL_TIMEFRAME_YEARS};
use crate::schema::ProjectionResponse;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ProjectionEngine>,
}

pub fn router(engine: Arc<ProjectionEngine>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/predict-with-goal", post(predict_with_goal))
        .route(
            "/calculate-goal-requirements",
            post(goal_requirements),
        )
        .with_state(AppState { engine })
}

impl IntoResponse for ProjectionError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ProjectionError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ProjectionError::EmptyUpstreamResponse => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            ProjectionError::SchemaViolation(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            // Transport and serialization causes are logged, not exposed.
            ProjectionError::UpstreamTransport(_) | ProjectionError::SerializationError(_) => {
                error!("Internal failure: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        if status == StatusCode::BAD_REQUEST {
            warn!("Rejected request: {detail}");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Financial Projection API is running" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
struct PredictQuery {
    goal_target_revenue: Option<f64>,
    goal_timeframe_years: Option<u32>,
}

async fn predict(
    State(state): State<AppState>,
    Query(query): Query<PredictQuery>,
    multipart: Multipart,
) -> Result<Json<ProjectionResponse>> {
    let (profit_loss, balance_sheet) = read_statement_files(multipart).await?;
    let goal = query
        .goal_target_revenue
        .map(|target| GoalParams::new(target, query.goal_timeframe_years));

    let response = state
        .engine
        .generate_projection(ProjectionRequest {
            profit_loss,
            balance_sheet,
            goal,
        })
        .await?;
    Ok(Json(response))
}

// target_revenue is required but extracted as Option so its absence goes
// through the same error envelope as every other client mistake, instead
// of axum's plain-text Query rejection.
#[derive(Debug, Deserialize)]
struct GoalQuery {
    target_revenue: Option<f64>,
    timeframe_years: Option<u32>,
}

fn default_timeframe_years() -> u32 {
    DEFAULT_GOAL_TIMEFRAME_YEARS
}

async fn predict_with_goal(
    State(state): State<AppState>,
    Query(query): Query<GoalQuery>,
    multipart: Multipart,
) -> Result<Json<ProjectionResponse>> {
    let target_revenue = query.target_revenue.ok_or_else(|| {
        ProjectionError::InvalidInput(
            "missing required query parameter 'target_revenue'".to_string(),
        )
    })?;
    let (profit_loss, balance_sheet) = read_statement_files(multipart).await?;

    let response = state
        .engine
        .generate_projection(ProjectionRequest {
            profit_loss,
            balance_sheet,
            goal: Some(GoalParams::new(target_revenue, query.timeframe_years)),
        })
        .await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct GoalCalculationBody {
    current_revenue: f64,
    target_revenue: f64,
    #[serde(default = "default_timeframe_years")]
    timeframe_years: u32,
}

async fn goal_requirements(
    Json(body): Json<GoalCalculationBody>,
) -> Result<Json<GoalRequirements>> {
    let requirements = calculate_goal_requirements(
        body.current_revenue,
        body.target_revenue,
        body.timeframe_years,
    )?;
    Ok(Json(requirements))
}

/// Pull the two required statement files out of the multipart body. Unknown
/// fields are ignored; missing fields are a client error.
async fn read_statement_files(mut multipart: Multipart) -> Result<(CsvDocument, CsvDocument)> {
    let mut profit_loss = None;
    let mut balance_sheet = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ProjectionError::InvalidInput(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ProjectionError::InvalidInput(format!("failed to read '{name}': {e}")))?
            .to_vec();

        match name.as_str() {
            "profit_loss_file" => profit_loss = Some(CsvDocument::new(filename, bytes)),
            "balance_sheet_file" => balance_sheet = Some(CsvDocument::new(filename, bytes)),
            _ => {}
        }
    }

    let profit_loss = profit_loss.ok_or_else(|| {
        ProjectionError::InvalidInput("missing 'profit_loss_file' upload".to_string())
    })?;
    let balance_sheet = balance_sheet.ok_or_else(|| {
        ProjectionError::InvalidInput("missing 'balance_sheet_file' upload".to_string())
    })?;
    Ok((profit_loss, balance_sheet))
}
