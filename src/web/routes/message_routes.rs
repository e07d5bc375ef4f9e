use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

use crate::db::models::Message;
use crate::db::services::message_service;
use crate::web::error::AppError;
use crate::web::forms::validate_message;
use crate::web::AppState;

// --- Request Structs ---

#[derive(Deserialize)]
pub struct CreateMessageRequest {
    message: String,
}

// --- Route Handlers ---

async fn list_messages_handler(
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<String>,
) -> Result<Json<Vec<Message>>, AppError> {
    let messages = message_service::list_messages(
        &app_state.db_pool,
        app_state.config.message_key_column,
        app_state.config.sort_order,
        &tag_id,
    )
    .await
    .map_err(|err| {
        error!("failed to load messages for tag {tag_id}: {err}");
        AppError::from(err)
    })?;

    Ok(Json(messages))
}

async fn create_message_handler(
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<String>,
    Json(payload): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let text = validate_message(&payload.message).map_err(AppError::InvalidInput)?;

    let message = message_service::insert_message(
        &app_state.db_pool,
        app_state.config.message_key_column,
        &tag_id,
        text,
    )
    .await
    .map_err(|err| {
        error!("failed to append message to tag {tag_id}: {err}");
        AppError::from(err)
    })?;

    Ok((StatusCode::CREATED, Json(message)))
}

// --- Router ---

pub fn create_messages_router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/{tag_id}/messages",
        get(list_messages_handler).post(create_message_handler),
    )
}
