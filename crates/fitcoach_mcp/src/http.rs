//! REST routes plus the streamable MCP service, served by `bin/server.rs`.

use std::sync::Arc;
use std::time::Duration;

use axum::debug_handler;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tower_http::timeout::TimeoutLayer;

use fitcoach_client::FitcoachError;
use fitcoach_client::observability::Health;

use crate::domains::coach::COACH_GREETING;
use crate::domains::workouts::WorkoutDetail;
use crate::error::McpError;
use crate::services::FitnessService;
use crate::types::{
    CoachChatParams, CoachReply, LogMealParams, LogWorkoutParams, MealResult, MealTypesResult,
    ProfileResult, SaveProfileParams, WeeklyStatsParams, WeeklyStatsResult, WorkoutListResult,
    WorkoutTypesResult,
};
use crate::FitcoachMcpHandler;

pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

pub struct AppState {
    pub service: FitnessService,
    pub metrics: PrometheusHandle,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn map_err(e: McpError) -> ApiError {
    let status = match &e {
        McpError::Validation(_) => StatusCode::BAD_REQUEST,
        McpError::NotFound(_) => StatusCode::NOT_FOUND,
        McpError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        McpError::Api(FitcoachError::NotFound(_)) => StatusCode::NOT_FOUND,
        McpError::Api(FitcoachError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
        McpError::Api(_) => StatusCode::BAD_GATEWAY,
        McpError::Serialization(_) | McpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let error = match e {
        McpError::Internal(msg) => msg,
        other => other.to_string(),
    };
    (status, Json(ErrorBody { error }))
}

#[debug_handler]
async fn health(State(state): State<Arc<AppState>>) -> Json<Health> {
    Json(state.service.health())
}

#[debug_handler]
async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state.metrics.render();
    ([("content-type", "text/plain; version=0.0.4")], body)
}

#[derive(Debug, Default, Deserialize)]
struct WeeklyQuery {
    date: Option<String>,
    calendar_order: Option<bool>,
    goal: Option<u32>,
}

#[debug_handler]
async fn weekly_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(q): Query<WeeklyQuery>,
) -> Result<Json<WeeklyStatsResult>, ApiError> {
    state
        .service
        .weekly_stats(WeeklyStatsParams {
            user_id: Some(user_id),
            date: q.date,
            calendar_order: q.calendar_order,
            goal: q.goal,
        })
        .await
        .map(Json)
        .map_err(map_err)
}

#[derive(Debug, Default, Deserialize)]
struct RecentQuery {
    limit: Option<u32>,
}

#[debug_handler]
async fn recent_workouts(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(q): Query<RecentQuery>,
) -> Result<Json<WorkoutListResult>, ApiError> {
    state
        .service
        .recent_workouts(Some(user_id), q.limit)
        .await
        .map(Json)
        .map_err(map_err)
}

#[debug_handler]
async fn log_workout(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(mut body): Json<LogWorkoutParams>,
) -> Result<(StatusCode, Json<WorkoutDetail>), ApiError> {
    body.user_id = Some(user_id);
    let created = state.service.log_workout(body).await.map_err(map_err)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[debug_handler]
async fn get_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WorkoutDetail>, ApiError> {
    state
        .service
        .workout_detail(&id)
        .await
        .map(Json)
        .map_err(map_err)
}

#[debug_handler]
async fn workout_types(State(state): State<Arc<AppState>>) -> Json<WorkoutTypesResult> {
    Json(state.service.workout_types())
}

#[debug_handler]
async fn log_meal(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(mut body): Json<LogMealParams>,
) -> Result<(StatusCode, Json<MealResult>), ApiError> {
    body.user_id = Some(user_id);
    let created = state.service.log_meal(body).await.map_err(map_err)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[debug_handler]
async fn meal_types(State(state): State<Arc<AppState>>) -> Json<MealTypesResult> {
    Json(state.service.meal_types())
}

#[debug_handler]
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileResult>, ApiError> {
    let res = state
        .service
        .profile(Some(user_id.clone()))
        .await
        .map_err(map_err)?;
    if res.profile.is_none() {
        return Err(map_err(McpError::NotFound(format!("profile {user_id}"))));
    }
    Ok(Json(res))
}

#[debug_handler]
async fn save_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(mut body): Json<SaveProfileParams>,
) -> Result<(StatusCode, Json<ProfileResult>), ApiError> {
    body.user_id = Some(user_id);
    let res = state.service.save_profile(body).await.map_err(map_err)?;
    Ok((StatusCode::CREATED, Json(res)))
}

async fn chat_greeting() -> Json<CoachReply> {
    Json(CoachReply {
        message: COACH_GREETING.to_string(),
    })
}

#[debug_handler]
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CoachChatParams>,
) -> Result<Json<CoachReply>, ApiError> {
    state
        .service
        .coach_chat(body)
        .await
        .map(Json)
        .map_err(map_err)
}

pub fn router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    // one handler clone per MCP session
    let handler = FitcoachMcpHandler::new(state.service.clone());
    let factory = move || -> Result<_, std::io::Error> { Ok(handler.clone()) };
    let session = Arc::new(
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default(),
    );
    let mcp_service = rmcp::transport::streamable_http_server::tower::StreamableHttpService::new(
        factory,
        session,
        rmcp::transport::streamable_http_server::tower::StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/users/{id}/stats/weekly", get(weekly_stats))
        .route("/users/{id}/workouts", get(recent_workouts).post(log_workout))
        .route("/users/{id}/meals", post(log_meal))
        .route("/users/{id}/profile", get(get_profile).put(save_profile))
        .route("/workouts/{id}", get(get_workout))
        .route("/workout-types", get(workout_types))
        .route("/meal-types", get(meal_types))
        .route("/chat", get(chat_greeting).post(chat))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .nest_service("/mcp", mcp_service)
        .layer(axum::extract::DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}
