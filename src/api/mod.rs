//! HTTP API module
//!
//! The command/query surface the UI layer talks to: list, add and history
//! views, per-timer and per-category controls, and the completion alert.

pub mod handlers;
pub mod responses;

use std::{sync::Arc, time::Instant};

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::store::StoreHandle;
use handlers::*;

/// Shared handler state
pub struct ApiContext {
    pub store: StoreHandle,
    pub start_time: Instant,
}

impl ApiContext {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            store,
            start_time: Instant::now(),
        }
    }
}

/// Create the HTTP router with all endpoints
pub fn create_router(ctx: Arc<ApiContext>) -> Router {
    Router::new()
        .route("/timers", get(list_timers_handler).post(add_timer_handler))
        .route("/timers/:id/start", post(start_timer_handler))
        .route("/timers/:id/pause", post(pause_timer_handler))
        .route("/timers/:id/reset", post(reset_timer_handler))
        .route("/categories", get(list_categories_handler))
        .route("/categories/:category/start", post(bulk_start_handler))
        .route("/categories/:category/pause", post(bulk_pause_handler))
        .route("/categories/:category/reset", post(bulk_reset_handler))
        .route("/history", get(history_handler))
        .route("/alert", get(alert_handler).delete(clear_alert_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        persistence::{MemoryBlobStore, Persister},
        state::{AppState, Command, Reducer},
        store::TimerStore,
    };

    fn setup() -> (Router, StoreHandle) {
        let (handle, _task) = TimerStore::spawn(
            AppState::new(),
            Reducer::default(),
            Persister::new(Arc::new(MemoryBlobStore::new())),
        );
        let router = create_router(Arc::new(ApiContext::new(handle.clone())));
        (router, handle)
    }

    async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn add(router: &Router, name: &str, category: &str, duration: u64) -> String {
        let (status, body) = call(
            router,
            Method::POST,
            "/timers",
            Some(json!({ "name": name, "category": category, "duration": duration })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["timer"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn add_timer_validates_input() {
        let (router, _handle) = setup();

        let (status, body) = call(
            &router,
            Method::POST,
            "/timers",
            Some(json!({ "name": "", "category": "Workout", "duration": 30 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "Timer name must not be empty");

        let (status, _) = call(
            &router,
            Method::POST,
            "/timers",
            Some(json!({ "name": "Plank", "category": "Workout", "duration": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, body) = call(&router, Method::GET, "/timers", None).await;
        assert_eq!(body["timers"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn timer_controls_drive_the_store() {
        let (router, _handle) = setup();
        let id = add(&router, "Plank", "Workout", 30).await;

        let (status, body) = call(&router, Method::POST, &format!("/timers/{id}/start"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timers"][0]["status"], "running");
        assert_eq!(body["running"], 1);

        let (_, body) = call(&router, Method::POST, &format!("/timers/{id}/pause"), None).await;
        assert_eq!(body["timers"][0]["status"], "paused");

        let (status, _) = call(&router, Method::POST, "/timers/unknown/start", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn bulk_controls_and_grouping() {
        let (router, _handle) = setup();
        add(&router, "Email", "Work", 60).await;
        add(&router, "Laundry", "Home", 60).await;
        add(&router, "Review", "Work", 60).await;

        let (_, body) = call(&router, Method::POST, "/categories/Work/start", None).await;
        assert_eq!(body["running"], 2);

        let (_, body) = call(&router, Method::GET, "/categories", None).await;
        let groups = body["categories"].as_array().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["category"], "Work");
        assert_eq!(groups[0]["timers"].as_array().unwrap().len(), 2);

        let (_, body) = call(&router, Method::POST, "/categories/Work/reset", None).await;
        assert_eq!(body["running"], 0);
    }

    #[tokio::test]
    async fn alert_and_history_follow_completion() {
        let (router, handle) = setup();
        let id = add(&router, "Tea", "Kitchen", 1).await;
        call(&router, Method::POST, &format!("/timers/{id}/start"), None).await;
        handle.dispatch(Command::tick()).await.unwrap();

        let (_, body) = call(&router, Method::GET, "/alert", None).await;
        assert_eq!(body["alert"]["id"], id.as_str());
        assert_eq!(body["message"], "Congratulations! Timer \"Tea\" completed!");

        let (_, body) = call(&router, Method::GET, "/history", None).await;
        assert_eq!(body["history"][0]["name"], "Tea");
        assert!(body["history"][0]["completedAt"].is_string());

        let (_, body) = call(&router, Method::DELETE, "/alert", None).await;
        assert!(body["alert"].is_null());

        let (_, body) = call(&router, Method::GET, "/status", None).await;
        assert_eq!(body["completed"], 1);
        assert_eq!(body["alertPending"], false);
        assert!(body["uptimeSecs"].is_u64());
        assert!(body.get("alert_pending").is_none());
    }

    #[tokio::test]
    async fn closed_store_reports_unavailable() {
        let (router, handle) = setup();
        handle.shutdown().await.unwrap();

        let (status, body) = call(&router, Method::DELETE, "/alert", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (router, _handle) = setup();
        let (status, body) = call(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
