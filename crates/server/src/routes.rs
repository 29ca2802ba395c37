use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::file::user_store::UserStore;

use crate::errors::ApiError;

pub async fn health() -> Json<Health> {
    Json(Health { status: "user intake service is running" })
}

/// Accept one user record. A body that fails to parse as JSON arrives as
/// `None` and is rejected the same way as one missing required keys.
async fn receive_user(
    State(store): State<Arc<UserStore>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body.ok_or(ApiError::Validation)?;
    let record = store.submit(body).await?;
    Ok(Json(json!({
        "message": "User received and stored successfully",
        "user": record,
    })))
}

async fn get_users(State(store): State<Arc<UserStore>>) -> Result<Json<Vec<Value>>, ApiError> {
    let users = store.list().await?;
    Ok(Json(users))
}

/// Build the full application router: health, intake, and listing.
pub fn build_router(store: Arc<UserStore>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/receive_user", post(receive_user))
        .route("/users", get(get_users))
        .with_state(store)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
