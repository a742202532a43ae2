//! API key issuance.

use crate::auth::{SessionContext, authorize_open_route};
use crate::error::ApiResult;
use crate::metrics;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Extension, State};
use axum::http::HeaderMap;
use cfipd_metadata::accounts;
use serde::Serialize;

/// Response carrying a freshly issued key.
///
/// This is the only time the key is shown.
#[derive(Serialize)]
pub struct ApiKeyResponse {
    pub status: &'static str,
    pub api_key: String,
}

/// POST /generate-api-key - Issue a new API key.
pub async fn generate_api_key(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    headers: HeaderMap,
) -> ApiResult<Json<ApiKeyResponse>> {
    authorize_open_route(&state, &headers, &session).await?;

    let key = accounts::issue_key(state.metadata.as_ref()).await?;
    metrics::API_KEYS_ISSUED.inc();

    Ok(Json(ApiKeyResponse {
        status: "success",
        api_key: key.into_string(),
    }))
}
