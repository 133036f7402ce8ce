// File: app/api/health/route.rs
// Purpose: Liveness endpoint

use rhtmx::axum::response::IntoResponse;
use rhtmx::axum::Json;
use rhtmx::{handler_fn, ApiModule};
use serde_json::json;

pub fn module() -> ApiModule {
    ApiModule::new().get(handler_fn(|req| async move {
        Ok(Json(json!({
            "status": "ok",
            "requestId": req.request_id.to_string(),
        }))
        .into_response())
    }))
}
