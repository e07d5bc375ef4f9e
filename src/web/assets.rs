use axum::extract::Path;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use rust_embed::RustEmbed;
use tera::Tera;

#[derive(RustEmbed, Clone)]
#[folder = "templates/"]
struct Templates;

#[derive(RustEmbed, Clone)]
#[folder = "assets/"]
struct Assets;

/// Loads the embedded page templates into a single Tera instance at startup.
pub fn build_templates() -> Result<Tera, tera::Error> {
    let mut sources = Vec::new();
    for name in Templates::iter() {
        if let Some(file) = Templates::get(&name) {
            let source = String::from_utf8_lossy(&file.data).into_owned();
            sources.push((name.into_owned(), source));
        }
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(sources)?;
    Ok(tera)
}

pub async fn asset_handler(Path(path): Path<String>) -> Response {
    match Assets::get(&path) {
        Some(file) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref())],
                file.data.into_owned(),
            )
                .into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
