//! Landing page and single-slot file endpoints.

use crate::auth::{Caller, SessionContext, authorize, authorize_open_route};
use crate::error::{ApiError, ApiResult};
use crate::handlers::StatusResponse;
use crate::metrics;
use crate::pages;
use crate::state::AppState;
use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Extension, Multipart, Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use cfipd_core::FileKind;
use cfipd_storage::StorageError;
use serde::Serialize;

/// Multipart field carrying the upload.
const FILE_FIELD: &str = "file";

/// Response for a stored upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    /// Canonical name the content was stored under.
    pub filename: String,
    /// Name the client sent.
    pub originalname: String,
    /// Whether a file occupied the slot before this upload.
    pub replaced: bool,
}

/// Current slot contents.
#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub status: &'static str,
    pub files: Vec<String>,
}

/// GET / - Landing page with the upload form.
pub async fn index(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Response> {
    let Some(user) = &session.user else {
        return Ok(Redirect::to("/login").into_response());
    };

    let files = state.slot.list().await?;
    let page = pages::index_page(&user.username, &files, state.config.server.max_upload_bytes);
    Ok(Html(page).into_response())
}

fn rejection_reason(error: &cfipd_core::Error) -> &'static str {
    match error {
        cfipd_core::Error::NoFileSelected => "no_file_selected",
        cfipd_core::Error::UnsupportedType(_) => "unsupported_type",
        _ => "invalid",
    }
}

/// Map a multipart read failure, keeping the body limit visible as a 413.
fn multipart_error(error: MultipartError) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        metrics::record_upload_rejection("too_large");
        ApiError::PayloadTooLarge("file too large".to_string())
    } else {
        metrics::record_upload_rejection("malformed");
        ApiError::BadRequest(error.body_text())
    }
}

/// POST /upload - Store a CSV or TXT file in the slot.
///
/// Admits either a valid `X-API-Key` or a logged-in session.
pub async fn upload(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let caller = authorize(&state, &headers, &session).await?;
    let mut multipart = multipart.map_err(|e| {
        metrics::record_upload_rejection("malformed");
        ApiError::BadRequest(e.body_text())
    })?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let originalname = field.file_name().unwrap_or_default().to_string();
        // Refuse before buffering the body.
        let kind = match FileKind::from_filename(&originalname) {
            Ok(kind) => kind,
            Err(e) => {
                metrics::record_upload_rejection(rejection_reason(&e));
                tracing::info!(originalname = %originalname, error = %e, "Refused upload");
                return Err(e.into());
            }
        };

        let content = field.bytes().await.map_err(multipart_error)?;
        let stored = state.slot.replace(&originalname, content).await?;

        metrics::record_delete_failures("replace", stored.stale_left);
        metrics::UPLOADS_ACCEPTED
            .with_label_values(&[kind.extension()])
            .inc();
        metrics::UPLOAD_BYTES.inc_by(stored.size);

        tracing::info!(
            caller = caller.kind(),
            filename = %stored.filename,
            originalname = %stored.originalname,
            size = stored.size,
            replaced = stored.replaced,
            "Stored upload"
        );

        return Ok(Json(UploadResponse {
            status: "success",
            filename: stored.filename,
            originalname: stored.originalname,
            replaced: stored.replaced,
        }));
    }

    metrics::record_upload_rejection("missing_file");
    Err(ApiError::BadRequest("no file part in request".to_string()))
}

/// POST /clear-files - Empty the slot.
///
/// Files that fail to delete are logged and counted; the request still succeeds.
pub async fn clear_files(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    headers: HeaderMap,
) -> ApiResult<Json<StatusResponse>> {
    let caller = authorize_open_route(&state, &headers, &session).await?;
    let report = state.slot.clear().await?;

    metrics::SLOT_CLEARS.inc();
    metrics::record_delete_failures("clear", report.failed.len());
    tracing::info!(
        caller = caller.as_ref().map_or("anonymous", Caller::kind),
        removed = report.removed.len(),
        failed = report.failed.len(),
        "Cleared upload slot"
    );

    Ok(Json(StatusResponse::success()))
}

/// GET /uploads/{filename} - Serve the stored file inline as plain text.
///
/// Every failure, including refused paths, is reported as a 404.
pub async fn get_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let content = state.slot.fetch(&filename).await.map_err(|e| {
        match &e {
            StorageError::Io(_) => {
                tracing::error!(filename = %filename, error = %e, "Failed to read upload")
            }
            _ => tracing::debug!(filename = %filename, error = %e, "Upload not served"),
        }
        ApiError::NotFound("file not found".to_string())
    })?;

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8"),
            (CONTENT_DISPOSITION, "inline"),
            (CACHE_CONTROL, "no-cache"),
        ],
        content,
    )
        .into_response())
}

/// GET /files - List the slot contents for the logged-in user.
pub async fn list_files(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Json<FilesResponse>> {
    if !session.is_authenticated() {
        return Err(ApiError::Unauthorized("Unauthorized".to_string()));
    }

    let files = state.slot.list().await?.into_iter().collect();
    Ok(Json(FilesResponse {
        status: "success",
        files,
    }))
}
