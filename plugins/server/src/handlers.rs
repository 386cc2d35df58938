//! Request handlers for the save endpoint

use crate::exposed::{controller_name, find_exposed_functions};
use crate::store::{normalize_content, FileStore};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use scribe_core::{boundary_from_content_type, parse_multipart, Field, FileSnapshot, SaveResponse};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared state for all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<FileStore>,
}

fn field<'a>(fields: &'a [Field], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.data.as_str())
}

fn bad_request(message: &str, app: &str, path: &str) -> Response {
    warn!("Rejected save for {}/{}: {}", app, path, message);
    (
        StatusCode::BAD_REQUEST,
        Json(SaveResponse::refused(message, format!("/edit/{}/{}", app, path))),
    )
        .into_response()
}

fn internal_error(err: scribe_core::ScribeError) -> Response {
    warn!("Save endpoint failure: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

/// `POST /edit/:app/*path`: accept a multipart save from the editor page
pub async fn save_file(
    State(state): State<AppState>,
    Path((app, path)): Path<(String, String)>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = path.trim_start_matches('/').to_string();
    let file = match state.store.resolve(&app, &path) {
        Ok(file) => file,
        Err(e) => {
            warn!("{}", e);
            return (StatusCode::FORBIDDEN, "Access denied").into_response();
        }
    };

    let Some(boundary) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(boundary_from_content_type)
    else {
        return bad_request("expected a multipart body", &app, &path);
    };

    let fields = match parse_multipart(&body, &boundary) {
        Ok(fields) => fields,
        Err(e) => return bad_request(&e.to_string(), &app, &path),
    };

    let Some(data) = field(&fields, "data") else {
        return bad_request("missing data field", &app, &path);
    };
    if field(&fields, "from_ajax").is_none() {
        debug!("Save for {}/{} did not come from the asynchronous editor", app, path);
    }
    let submitted_hash = field(&fields, "file_hash").unwrap_or_default();
    let content = normalize_content(data);

    let current = match state.store.read(&file).await {
        Ok(current) => current,
        Err(e) => return internal_error(e),
    };

    if let Some(current) = current {
        if !submitted_hash.is_empty() && submitted_hash != current.file_hash {
            info!("{} changed on disk since it was opened", file.display());
            if let Err(e) = state.store.write_backup(&file, &content).await {
                return internal_error(e);
            }
            return Json(SaveResponse::refused(
                "file changed on disk",
                format!("/resolve/{}/{}", app, path),
            ))
            .into_response();
        }
    }

    let stored = match state.store.write(&file, &content).await {
        Ok(stored) => stored,
        Err(e) => return internal_error(e),
    };
    info!("Saved {} ({})", file.display(), stored.file_hash);

    let mut response = SaveResponse::saved(stored.file_hash, stored.saved_on);
    response.application = Some(app);
    if let Some(controller) = controller_name(&path) {
        response.functions = find_exposed_functions(&content);
        response.controller = Some(controller);
    }

    Json(response).into_response()
}

/// `GET /edit/:app/*path`: current content, hash and modification time
pub async fn load_file(
    State(state): State<AppState>,
    Path((app, path)): Path<(String, String)>,
) -> Response {
    let file = match state.store.resolve(&app, &path) {
        Ok(file) => file,
        Err(e) => {
            warn!("{}", e);
            return (StatusCode::FORBIDDEN, "Access denied").into_response();
        }
    };

    match state.store.read(&file).await {
        Ok(Some(stored)) => Json(FileSnapshot {
            data: stored.content,
            file_hash: stored.file_hash,
            saved_on: stored.saved_on,
        })
        .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "File not found").into_response(),
        Err(e) => internal_error(e),
    }
}

/// `GET /keepalive`
pub async fn keepalive() -> &'static str {
    "ok"
}
