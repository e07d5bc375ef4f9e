use axum::{
    Router,
    http::{Method, Uri},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use sqlx::PgPool;
use std::sync::Arc;
use tera::Tera;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;

pub mod assets;
pub mod error;
pub mod forms;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<AppConfig>,
    pub templates: Tera,
}

async fn health_check_handler() -> &'static str {
    "OK"
}

/// Extracts a tag identifier from a raw request path: leading and trailing
/// slashes stripped, first segment taken, percent-decoding applied, and the
/// literal `"default"` when nothing is left. Any string is a valid tag.
pub fn tag_from_path(path: &str) -> String {
    let first_segment = path.trim_matches('/').split('/').next().unwrap_or("");
    let decoded = urlencoding::decode(first_segment)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| first_segment.to_string());

    if decoded.is_empty() {
        "default".to_string()
    } else {
        decoded
    }
}

// Unmatched paths (trailing slashes, deep links from old tags) are
// normalized onto the canonical tag page instead of 404ing.
async fn fallback_handler(uri: Uri) -> Response {
    let tag = tag_from_path(uri.path());
    Redirect::to(&format!("/{}", urlencoding::encode(&tag))).into_response()
}

pub fn create_router(db_pool: PgPool, config: Arc<AppConfig>) -> Result<Router, tera::Error> {
    let templates = assets::build_templates()?;
    let app_state = Arc::new(AppState {
        db_pool,
        config,
        templates,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let api_router = routes::message_routes::create_messages_router()
        .merge(routes::recipe_routes::create_recipes_router());

    Ok(Router::new()
        .route("/api/health", get(health_check_handler))
        .nest("/api/tags", api_router)
        .route("/assets/{*path}", get(assets::asset_handler))
        .merge(routes::page_routes::create_pages_router())
        .fallback(fallback_handler)
        .with_state(app_state)
        .layer(cors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_segment_paths_resolve_to_the_tag() {
        assert_eq!(tag_from_path("/demo-tag"), "demo-tag");
        assert_eq!(tag_from_path("/demo-tag/"), "demo-tag");
        assert_eq!(tag_from_path("demo-tag"), "demo-tag");
    }

    #[test]
    fn deep_paths_resolve_to_the_first_segment() {
        assert_eq!(tag_from_path("/mein-tag-123/recipes/extra"), "mein-tag-123");
    }

    #[test]
    fn percent_encoding_is_decoded() {
        assert_eq!(tag_from_path("/mein%20tag"), "mein tag");
        assert_eq!(tag_from_path("/caf%C3%A9"), "café");
    }

    #[test]
    fn empty_paths_fall_back_to_the_default_tag() {
        assert_eq!(tag_from_path(""), "default");
        assert_eq!(tag_from_path("/"), "default");
        assert_eq!(tag_from_path("///"), "default");
    }
}
