//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use super::{
    responses::{
        AlertResponse, CategoriesResponse, CreatedResponse, ErrorResponse, HealthResponse,
        HistoryResponse, StatusResponse, TimersResponse,
    },
    ApiContext,
};
use crate::{
    error::StoreError,
    state::{AppState, Command, NewTimer, TimerId},
};

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<T, ApiError>;

fn store_unavailable(e: StoreError) -> ApiError {
    error!("Failed to reach timer store: {}", e);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse::new(e.to_string())),
    )
}

async fn dispatch(ctx: &ApiContext, command: Command) -> ApiResult<Arc<AppState>> {
    ctx.store.dispatch(command).await.map_err(store_unavailable)
}

async fn dispatch_for_timers(ctx: &ApiContext, command: Command) -> ApiResult<Json<TimersResponse>> {
    let state = dispatch(ctx, command).await?;
    Ok(Json(TimersResponse::from_state(&state)))
}

/// Handle GET /timers - List timers in insertion order
pub async fn list_timers_handler(State(ctx): State<Arc<ApiContext>>) -> Json<TimersResponse> {
    Json(TimersResponse::from_state(&ctx.store.snapshot()))
}

/// Handle GET /categories - Timers grouped by category
pub async fn list_categories_handler(State(ctx): State<Arc<ApiContext>>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: ctx.store.snapshot().grouped_by_category(),
    })
}

/// Handle POST /timers - Validate and add a timer
pub async fn add_timer_handler(
    State(ctx): State<Arc<ApiContext>>,
    Json(new_timer): Json<NewTimer>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let timer = new_timer.validate().map_err(|e| {
        warn!("Rejected new timer: {}", e);
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new(e.to_string())),
        )
    })?;

    let id = timer.id.clone();
    let state = dispatch(&ctx, Command::AddTimer(timer)).await?;
    let created = state.timer(&id).cloned().ok_or_else(|| {
        error!("Timer {} missing right after it was added", id);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Timer was not added")),
        )
    })?;

    info!("Added timer '{}' in category '{}'", created.name, created.category);
    Ok((StatusCode::CREATED, Json(CreatedResponse::new(created))))
}

/// Handle POST /timers/:id/start
pub async fn start_timer_handler(
    State(ctx): State<Arc<ApiContext>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TimersResponse>> {
    dispatch_for_timers(&ctx, Command::StartTimer { id: TimerId::from(id) }).await
}

/// Handle POST /timers/:id/pause
pub async fn pause_timer_handler(
    State(ctx): State<Arc<ApiContext>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TimersResponse>> {
    dispatch_for_timers(&ctx, Command::PauseTimer { id: TimerId::from(id) }).await
}

/// Handle POST /timers/:id/reset
pub async fn reset_timer_handler(
    State(ctx): State<Arc<ApiContext>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TimersResponse>> {
    dispatch_for_timers(&ctx, Command::ResetTimer { id: TimerId::from(id) }).await
}

/// Handle POST /categories/:category/start - Start every timer in a category
pub async fn bulk_start_handler(
    State(ctx): State<Arc<ApiContext>>,
    Path(category): Path<String>,
) -> ApiResult<Json<TimersResponse>> {
    info!("Bulk start for category '{}'", category);
    dispatch_for_timers(&ctx, Command::BulkStart { category }).await
}

/// Handle POST /categories/:category/pause
pub async fn bulk_pause_handler(
    State(ctx): State<Arc<ApiContext>>,
    Path(category): Path<String>,
) -> ApiResult<Json<TimersResponse>> {
    info!("Bulk pause for category '{}'", category);
    dispatch_for_timers(&ctx, Command::BulkPause { category }).await
}

/// Handle POST /categories/:category/reset
pub async fn bulk_reset_handler(
    State(ctx): State<Arc<ApiContext>>,
    Path(category): Path<String>,
) -> ApiResult<Json<TimersResponse>> {
    info!("Bulk reset for category '{}'", category);
    dispatch_for_timers(&ctx, Command::BulkReset { category }).await
}

/// Handle GET /history - Completed timers, oldest first
pub async fn history_handler(State(ctx): State<Arc<ApiContext>>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        history: ctx.store.snapshot().history.clone(),
    })
}

/// Handle GET /alert - Pending completion alert
pub async fn alert_handler(State(ctx): State<Arc<ApiContext>>) -> Json<AlertResponse> {
    Json(AlertResponse::from_state(&ctx.store.snapshot()))
}

/// Handle DELETE /alert - Acknowledge the pending alert
pub async fn clear_alert_handler(State(ctx): State<Arc<ApiContext>>) -> ApiResult<Json<AlertResponse>> {
    let state = dispatch(&ctx, Command::ClearAlert).await?;
    Ok(Json(AlertResponse::from_state(&state)))
}

/// Handle GET /status - Board summary
pub async fn status_handler(State(ctx): State<Arc<ApiContext>>) -> Json<StatusResponse> {
    let state = ctx.store.snapshot();
    Json(StatusResponse {
        timers: state.timers.len(),
        running: state.running_count(),
        completed: state.timers.iter().filter(|t| t.is_completed()).count(),
        history: state.history.len(),
        alert_pending: state.has_pending_alert(),
        uptime_secs: ctx.start_time.elapsed().as_secs(),
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
