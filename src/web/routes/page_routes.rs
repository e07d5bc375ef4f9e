use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::Form;
use serde::Deserialize;
use std::sync::Arc;
use tera::Context;
use tracing::error;

use crate::config::BookMode;
use crate::db::models::{Message, Recipe};
use crate::db::services::{message_service, recipe_service};
use crate::web::error::AppError;
use crate::web::forms::{IngredientSlots, PageState, RecipeDraft, validate_message};
use crate::web::AppState;

// --- Form Structs ---

#[derive(Deserialize)]
pub struct MessageBoardForm {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
pub struct RecipeBookForm {
    #[serde(default)]
    action: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    ingredients: Vec<String>,
    #[serde(default)]
    preparation: String,
}

// --- Rendering Helpers ---

fn render_page(
    app_state: &AppState,
    template: &str,
    context: &Context,
    status: StatusCode,
) -> Result<Response, AppError> {
    let html = app_state.templates.render(template, context)?;
    Ok((status, Html(html)).into_response())
}

fn tag_page_url(tag_id: &str) -> String {
    format!("/{}", urlencoding::encode(tag_id))
}

/// Renders the recipe book page: the tag's recipe list plus the append form
/// with whatever values the visitor has entered so far.
async fn render_recipe_book(
    app_state: &AppState,
    tag_id: &str,
    form_name: &str,
    slots: &IngredientSlots,
    form_preparation: &str,
    form_error: Option<String>,
) -> Result<Response, AppError> {
    let result =
        recipe_service::list_recipes(&app_state.db_pool, app_state.config.sort_order, tag_id).await;
    if let Err(err) = &result {
        error!("failed to load recipes for tag {tag_id}: {err}");
    }

    let mut context = Context::new();
    context.insert("tag_id", tag_id);
    match PageState::from_list(result) {
        PageState::Loaded(recipes) => {
            context.insert("recipes", &recipes);
            context.insert("load_error", "");
        }
        PageState::Empty => {
            context.insert("recipes", &Vec::<Recipe>::new());
            context.insert("load_error", "");
        }
        PageState::Error(message) => {
            context.insert("recipes", &Vec::<Recipe>::new());
            context.insert("load_error", &format!("Fehler beim Laden: {message}"));
        }
    }
    context.insert("form_name", form_name);
    context.insert("form_rows", slots.values());
    context.insert("form_preparation", form_preparation);
    context.insert("form_error", &form_error.unwrap_or_default());

    render_page(app_state, "tag_recipes.html", &context, StatusCode::OK)
}

/// Renders the message board page, the older variant of the tag page.
async fn render_message_board(
    app_state: &AppState,
    tag_id: &str,
    form_message: &str,
    form_error: Option<String>,
) -> Result<Response, AppError> {
    let result = message_service::list_messages(
        &app_state.db_pool,
        app_state.config.message_key_column,
        app_state.config.sort_order,
        tag_id,
    )
    .await;
    if let Err(err) = &result {
        error!("failed to load messages for tag {tag_id}: {err}");
    }

    let mut context = Context::new();
    context.insert("tag_id", tag_id);
    match PageState::from_list(result) {
        PageState::Loaded(messages) => {
            context.insert("messages", &messages);
            context.insert("load_error", "");
        }
        PageState::Empty => {
            context.insert("messages", &Vec::<Message>::new());
            context.insert("load_error", "");
        }
        PageState::Error(message) => {
            context.insert("messages", &Vec::<Message>::new());
            context.insert("load_error", &format!("Fehler beim Laden: {message}"));
        }
    }
    context.insert("form_message", form_message);
    context.insert("form_error", &form_error.unwrap_or_default());

    render_page(app_state, "tag_messages.html", &context, StatusCode::OK)
}

// --- Route Handlers ---

async fn landing_handler(State(app_state): State<Arc<AppState>>) -> Result<Response, AppError> {
    render_page(&app_state, "landing.html", &Context::new(), StatusCode::OK)
}

async fn tag_page_handler(
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<String>,
) -> Result<Response, AppError> {
    match app_state.config.book_mode {
        BookMode::Recipes => {
            render_recipe_book(&app_state, &tag_id, "", &IngredientSlots::new(), "", None).await
        }
        BookMode::Messages => render_message_board(&app_state, &tag_id, "", None).await,
    }
}

async fn post_message_handler(
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<String>,
    Form(form): Form<MessageBoardForm>,
) -> Result<Response, AppError> {
    // The message form only exists on the message board.
    if app_state.config.book_mode == BookMode::Recipes {
        return Ok(Redirect::to(&tag_page_url(&tag_id)).into_response());
    }

    let text = match validate_message(&form.message) {
        Ok(text) => text,
        Err(message) => {
            return render_message_board(&app_state, &tag_id, &form.message, Some(message)).await;
        }
    };

    match message_service::insert_message(
        &app_state.db_pool,
        app_state.config.message_key_column,
        &tag_id,
        text,
    )
    .await
    {
        Ok(_) => Ok(Redirect::to(&tag_page_url(&tag_id)).into_response()),
        Err(err) => {
            error!("failed to append message to tag {tag_id}: {err}");
            // Keep the input so nothing is lost; the visitor can retry.
            render_message_board(
                &app_state,
                &tag_id,
                &form.message,
                Some(format!("Fehler beim Senden: {err}")),
            )
            .await
        }
    }
}

async fn recipe_form_handler(
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<String>,
    Form(form): Form<RecipeBookForm>,
) -> Result<Response, AppError> {
    let mut slots = IngredientSlots::from_submitted(form.ingredients);

    if form.action == "add_row" {
        slots.grow();
        return render_recipe_book(&app_state, &tag_id, &form.name, &slots, &form.preparation, None)
            .await;
    }

    if let Some(index) = form.action.strip_prefix("remove_row:") {
        if let Ok(index) = index.parse::<usize>() {
            slots.remove(index);
        }
        return render_recipe_book(&app_state, &tag_id, &form.name, &slots, &form.preparation, None)
            .await;
    }

    let draft = RecipeDraft {
        name: form.name.clone(),
        slots: slots.clone(),
        preparation: form.preparation.clone(),
    };
    let new_recipe = match draft.validate() {
        Ok(new_recipe) => new_recipe,
        Err(message) => {
            return render_recipe_book(
                &app_state,
                &tag_id,
                &form.name,
                &slots,
                &form.preparation,
                Some(message),
            )
            .await;
        }
    };

    match recipe_service::insert_recipe(
        &app_state.db_pool,
        app_state.config.ingredient_storage,
        &tag_id,
        &new_recipe,
    )
    .await
    {
        Ok(_) => Ok(Redirect::to(&tag_page_url(&tag_id)).into_response()),
        Err(err) => {
            error!("failed to append recipe to tag {tag_id}: {err}");
            render_recipe_book(
                &app_state,
                &tag_id,
                &form.name,
                &slots,
                &form.preparation,
                Some(format!("Fehler beim Speichern: {err}")),
            )
            .await
        }
    }
}

async fn recipe_detail_handler(
    State(app_state): State<Arc<AppState>>,
    Path((tag_id, id)): Path<(String, i64)>,
) -> Result<Response, AppError> {
    let mut context = Context::new();
    context.insert("tag_id", &tag_id);
    context.insert("load_error", "");
    context.insert("found", &false);

    match recipe_service::get_recipe_by_id(&app_state.db_pool, id).await {
        Ok(Some(recipe)) => {
            context.insert("found", &true);
            context.insert("ingredient_list", &recipe.ingredient_list());
            context.insert("shopping_list", &recipe.shopping_list());
            context.insert("recipe", &recipe);
            render_page(&app_state, "recipe_detail.html", &context, StatusCode::OK)
        }
        Ok(None) => render_page(
            &app_state,
            "recipe_detail.html",
            &context,
            StatusCode::NOT_FOUND,
        ),
        Err(err) => {
            error!("failed to load recipe {id}: {err}");
            context.insert("load_error", &format!("Fehler beim Laden: {err}"));
            render_page(&app_state, "recipe_detail.html", &context, StatusCode::OK)
        }
    }
}

/// Standalone print/share prototype. Not linked from the tag flow; the
/// share and print buttons on the page swallow failures.
async fn print_recipe_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let recipe = recipe_service::get_recipe_by_id(&app_state.db_pool, id)
        .await
        .map_err(|err| {
            error!("failed to load recipe {id}: {err}");
            AppError::from(err)
        })?
        .ok_or_else(|| AppError::NotFound("recipe not found".to_string()))?;

    let steps: Vec<&str> = recipe
        .preparation
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut context = Context::new();
    context.insert("ingredient_list", &recipe.ingredient_list());
    context.insert("steps", &steps);
    context.insert("recipe", &recipe);
    render_page(&app_state, "recipe_print.html", &context, StatusCode::OK)
}

// --- Router ---

pub fn create_pages_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(landing_handler))
        .route("/print/recipes/{id}", get(print_recipe_handler))
        .route("/{tag_id}", get(tag_page_handler).post(post_message_handler))
        .route("/{tag_id}/recipes", post(recipe_form_handler))
        .route("/{tag_id}/recipes/{id}", get(recipe_detail_handler))
}
