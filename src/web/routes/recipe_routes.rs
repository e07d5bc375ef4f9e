use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

use crate::db::models::Recipe;
use crate::db::services::recipe_service;
use crate::web::error::AppError;
use crate::web::forms::{IngredientSlots, RecipeDraft};
use crate::web::AppState;

// --- Request Structs ---

#[derive(Deserialize)]
pub struct CreateRecipeRequest {
    name: String,
    #[serde(default)]
    ingredients: Vec<String>,
    preparation: String,
}

// --- Route Handlers ---

async fn list_recipes_handler(
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<String>,
) -> Result<Json<Vec<Recipe>>, AppError> {
    let recipes =
        recipe_service::list_recipes(&app_state.db_pool, app_state.config.sort_order, &tag_id)
            .await
            .map_err(|err| {
                error!("failed to load recipes for tag {tag_id}: {err}");
                AppError::from(err)
            })?;

    Ok(Json(recipes))
}

async fn create_recipe_handler(
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<String>,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<Recipe>), AppError> {
    let draft = RecipeDraft {
        name: payload.name,
        slots: IngredientSlots::from_submitted(payload.ingredients),
        preparation: payload.preparation,
    };
    let new_recipe = draft.validate().map_err(AppError::InvalidInput)?;

    let recipe = recipe_service::insert_recipe(
        &app_state.db_pool,
        app_state.config.ingredient_storage,
        &tag_id,
        &new_recipe,
    )
    .await
    .map_err(|err| {
        error!("failed to append recipe to tag {tag_id}: {err}");
        AppError::from(err)
    })?;

    Ok((StatusCode::CREATED, Json(recipe)))
}

// Detail lookup matches on id alone; the tag segment only shapes the URL.
async fn get_recipe_handler(
    State(app_state): State<Arc<AppState>>,
    Path((_tag_id, id)): Path<(String, i64)>,
) -> Result<Json<Recipe>, AppError> {
    let recipe = recipe_service::get_recipe_by_id(&app_state.db_pool, id)
        .await
        .map_err(|err| {
            error!("failed to load recipe {id}: {err}");
            AppError::from(err)
        })?
        .ok_or_else(|| AppError::NotFound("recipe not found".to_string()))?;

    Ok(Json(recipe))
}

async fn shopping_list_handler(
    State(app_state): State<Arc<AppState>>,
    Path((_tag_id, id)): Path<(String, i64)>,
) -> Result<Response, AppError> {
    let recipe = recipe_service::get_recipe_by_id(&app_state.db_pool, id)
        .await
        .map_err(|err| {
            error!("failed to load recipe {id}: {err}");
            AppError::from(err)
        })?
        .ok_or_else(|| AppError::NotFound("recipe not found".to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        recipe.shopping_list(),
    )
        .into_response())
}

// --- Router ---

pub fn create_recipes_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/{tag_id}/recipes",
            get(list_recipes_handler).post(create_recipe_handler),
        )
        .route("/{tag_id}/recipes/{id}", get(get_recipe_handler))
        .route(
            "/{tag_id}/recipes/{id}/shopping-list",
            get(shopping_list_handler),
        )
}
