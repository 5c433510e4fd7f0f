use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;

use foliogit_auth::SESSION_COOKIE;
use foliogit_store::{RepoId, StoreError};

use crate::sections::{valid_file_name, MediaFolder, Section};
use crate::state::AppState;

/// Check the session cookie against the codec
fn is_authenticated(state: &AppState, jar: &CookieJar) -> bool {
    jar.get(SESSION_COOKIE)
        .map(|cookie| state.sessions.verify(cookie.value()))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn server_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}

/// Publish-failure response, distinguished from a generic 500 by the
/// `gitError` flag so the UI can show credential-check guidance
fn publish_error(message: String, extra: Value) -> Response {
    let mut body = serde_json::Map::new();
    body.insert("success".to_string(), Value::Bool(false));
    body.insert("message".to_string(), Value::String(message));
    body.insert("gitError".to_string(), Value::Bool(true));
    if let Value::Object(extra) = extra {
        body.extend(extra);
    }
    (StatusCode::INTERNAL_SERVER_ERROR, Json(Value::Object(body))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    secret: Option<String>,
}

/// POST /api/admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Response {
    let Some(secret) = body.secret.filter(|s| !s.is_empty()) else {
        return bad_request("Secret is required");
    };

    if secret != state.admin_secret {
        tracing::warn!("Login attempt with invalid secret");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid secret" })),
        )
            .into_response();
    }

    let token = match state.sessions.issue() {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to issue session token: {}", e);
            return server_error("Internal server error");
        }
    };

    let cookie = state.sessions.login_cookie(token, state.config.is_production());
    (
        jar.add(cookie),
        Json(json!({ "success": true, "message": "Login successful" })),
    )
        .into_response()
}

/// POST /api/admin/logout
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let cookie = state.sessions.logout_cookie(state.config.is_production());
    (
        jar.add(cookie),
        Json(json!({ "success": true, "message": "Logout successful" })),
    )
        .into_response()
}

/// GET /api/admin/verify
pub async fn verify(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if is_authenticated(&state, &jar) {
        (StatusCode::OK, Json(json!({ "authenticated": true }))).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "authenticated": false }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    section: Option<String>,
}

/// GET /api/admin/content?section=<name>
pub async fn content_get(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<ContentQuery>,
) -> Response {
    if !is_authenticated(&state, &jar) {
        return unauthorized();
    }

    let Some(section) = query.section.as_deref() else {
        return bad_request("Section parameter is required");
    };
    let Some(section) = Section::from_param(section) else {
        return bad_request("Invalid section");
    };

    let records: Vec<Value> = match state.store.read(&section.content_path()).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("Stored document for {} is malformed: {}", section.as_str(), e);
                return server_error("Failed to fetch content");
            }
        },
        // A section that was never published reads as an empty collection
        Err(e) if e.is_not_found() => Vec::new(),
        Err(e) => {
            tracing::error!("Content fetch error for {}: {}", section.as_str(), e);
            return server_error("Failed to fetch content");
        }
    };

    Json(json!({
        "success": true,
        "section": section.as_str(),
        "count": records.len(),
        "content": records,
    }))
    .into_response()
}

/// POST /api/admin/content
///
/// Replaces the named collection wholesale; there is no item-level update
/// at this boundary.
pub async fn content_update(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<Value>,
) -> Response {
    if !is_authenticated(&state, &jar) {
        return unauthorized();
    }

    let section = body.get("section").and_then(Value::as_str);
    let records = body.get("content").and_then(Value::as_array);
    let (Some(section), Some(records)) = (section, records) else {
        return bad_request("Section and content array are required");
    };
    let Some(section) = Section::from_param(section) else {
        return bad_request("Invalid section");
    };

    let document = match serde_json::to_vec_pretty(records) {
        Ok(document) => document,
        Err(e) => {
            tracing::error!("Failed to serialize {} content: {}", section.as_str(), e);
            return server_error("Failed to update content");
        }
    };

    let message = format!("Update {} content", section.as_str());
    if let Err(e) = state
        .store
        .write(&section.content_path(), &document, &message)
        .await
    {
        tracing::error!("Content publish failed for {}: {}", section.as_str(), e);
        if e.is_publish_failure() {
            return publish_error(
                format!(
                    "Failed to commit content to GitHub. Please check your GitHub credentials. ({e})"
                ),
                json!({ "section": section.as_str(), "count": records.len() }),
            );
        }
        return server_error("Failed to update content");
    }

    Json(json!({
        "success": true,
        "message": "Content updated successfully",
        "section": section.as_str(),
        "count": records.len(),
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct FolderQuery {
    folder: Option<String>,
}

/// GET /api/admin/media/files?folder=<name>
pub async fn media_files(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<FolderQuery>,
) -> Response {
    if !is_authenticated(&state, &jar) {
        return unauthorized();
    }

    let Some(folder) = query.folder.as_deref() else {
        return bad_request("Folder parameter is required");
    };
    let Some(folder) = MediaFolder::from_param(folder) else {
        return bad_request("Invalid folder");
    };

    let entries = match state.store.list(&folder.prefix()).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!("Media listing failed for {}: {}", folder.as_str(), e);
            return server_error("Failed to fetch media files");
        }
    };

    // Content documents live beside media in the repository tree; the media
    // browser never shows them
    let modified = chrono::Utc::now().to_rfc3339();
    let files: Vec<Value> = entries
        .iter()
        .filter(|entry| !entry.name.ends_with(".json"))
        .map(|entry| {
            json!({
                "name": entry.name,
                "path": folder.public_path(&entry.name),
                "size": entry.size,
                "type": "application/octet-stream",
                "modified": modified,
            })
        })
        .collect();

    Json(json!({
        "success": true,
        "folder": folder.as_str(),
        "count": files.len(),
        "files": files,
    }))
    .into_response()
}

/// PUT /api/admin/media/files and POST /api/admin/upload
///
/// Multipart fields: `file` (bytes), `folder`, `fileName`.
pub async fn media_upload(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Response {
    if !is_authenticated(&state, &jar) {
        return unauthorized();
    }

    let mut file: Option<bytes::Bytes> = None;
    let mut folder: Option<String> = None;
    let mut file_name: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Malformed multipart payload: {}", e);
                return bad_request("Invalid upload payload");
            }
        };

        let name = field.name().map(str::to_string);
        let result = match name.as_deref() {
            Some("file") => field.bytes().await.map(|bytes| file = Some(bytes)),
            Some("folder") => field.text().await.map(|text| folder = Some(text)),
            Some("fileName") => field.text().await.map(|text| file_name = Some(text)),
            _ => continue,
        };
        if let Err(e) = result {
            tracing::warn!("Failed to read multipart field: {}", e);
            return bad_request("Invalid upload payload");
        }
    }

    let (Some(file), Some(folder), Some(file_name)) = (file, folder, file_name) else {
        return bad_request("File, folder, and fileName are required");
    };
    let Some(folder) = MediaFolder::from_param(&folder) else {
        return bad_request("Invalid folder");
    };
    if !valid_file_name(&file_name) {
        return bad_request("Invalid file name");
    }

    let public_path = folder.public_path(&file_name);
    let message = format!("Upload {} to {}", file_name, folder.as_str());
    if let Err(e) = state
        .store
        .write(&folder.asset_path(&file_name), &file, &message)
        .await
    {
        tracing::error!("Media publish failed for {}: {}", public_path, e);
        if e.is_publish_failure() {
            return publish_error(
                "Failed to commit file to GitHub. Please check your GitHub credentials."
                    .to_string(),
                json!({ "path": public_path }),
            );
        }
        return server_error("Failed to upload file");
    }

    Json(json!({
        "success": true,
        "message": "File uploaded successfully",
        "path": public_path,
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    folder: Option<String>,
    #[serde(rename = "fileName")]
    file_name: Option<String>,
}

/// DELETE /api/admin/media/delete
pub async fn media_delete(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<DeleteRequest>,
) -> Response {
    if !is_authenticated(&state, &jar) {
        return unauthorized();
    }

    let (Some(folder), Some(file_name)) = (body.folder.as_deref(), body.file_name.as_deref())
    else {
        return bad_request("Folder and fileName are required");
    };
    let Some(folder) = MediaFolder::from_param(folder) else {
        return bad_request("Invalid folder");
    };
    if !valid_file_name(file_name) {
        return bad_request("Invalid file name");
    }

    let message = format!("Delete {} from {}", file_name, folder.as_str());
    match state
        .store
        .delete(&folder.asset_path(file_name), &message)
        .await
    {
        Ok(()) => Json(json!({
            "success": true,
            "message": "File deleted successfully",
            "fileName": file_name,
            "folder": folder.as_str(),
        }))
        .into_response(),
        // Development mode: the file was already gone locally
        Err(StoreError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "File not found" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Media delete failed for {}/{}: {}", folder.as_str(), file_name, e);
            if e.is_publish_failure() {
                return publish_error(
                    "Failed to delete file from GitHub. Please check your GitHub credentials."
                        .to_string(),
                    json!({ "fileName": file_name, "folder": folder.as_str() }),
                );
            }
            server_error("Failed to delete file")
        }
    }
}

/// GET /api/admin/stats/media
///
/// Aggregate non-JSON file count across every allow-listed folder.
/// Folders that cannot be listed are skipped rather than failing the whole
/// aggregate.
pub async fn media_stats(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if !is_authenticated(&state, &jar) {
        return unauthorized();
    }

    let mut total = 0usize;
    for folder in MediaFolder::ALL {
        match state.store.list(&folder.prefix()).await {
            Ok(entries) => {
                total += entries
                    .iter()
                    .filter(|entry| !entry.name.ends_with(".json"))
                    .count();
            }
            Err(e) => {
                tracing::debug!("Folder {} not listable: {}", folder.as_str(), e);
            }
        }
    }

    let folders: Vec<&str> = MediaFolder::ALL.iter().map(|f| f.as_str()).collect();
    Json(json!({ "count": total, "folders": folders })).into_response()
}

/// GET /api/admin/debug/env
///
/// Presence/absence of the host integration configuration, never the
/// secret values themselves.
pub async fn debug_env(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if !is_authenticated(&state, &jar) {
        return unauthorized();
    }

    let github = &state.config.github;
    let repo_format = github
        .repo
        .as_deref()
        .is_some_and(|repo| RepoId::from_str(repo).is_ok());

    Json(json!({
        "environment": state.config.environment,
        "hasGithubToken": github.token.as_deref().is_some_and(|t| !t.is_empty()),
        "githubRepo": github.repo,
        "githubBranch": github.branch,
        "repoFormat": if repo_format { "valid" } else { "invalid" },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
    .into_response()
}
