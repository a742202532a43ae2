//! Session resolution and the upload access gate.

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use cfipd_core::{API_KEY_HEADER, ApiKey};
use cfipd_metadata::accounts;
use tracing::Instrument;
use uuid::Uuid;

/// Maximum length for trace IDs.
/// Longer trace IDs are truncated to prevent log bloat and potential log injection.
const MAX_TRACE_ID_LEN: usize = 128;

/// Trace ID for request correlation.
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl TraceId {
    /// Generate a new random trace ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a trace ID from a client-provided value.
    /// The value is truncated to MAX_TRACE_ID_LEN characters and stripped of
    /// anything but printable ASCII.
    pub fn from_client(value: &str) -> Self {
        let sanitized: String = value
            .chars()
            .take(MAX_TRACE_ID_LEN)
            .filter(|c| c.is_ascii_graphic() || *c == ' ')
            .collect();

        if sanitized.is_empty() {
            Self::new()
        } else {
            Self(sanitized)
        }
    }

    /// Get the trace ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user with a live session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionUser {
    pub username: String,
}

/// Per-request session state, inserted by [`session_middleware`].
#[derive(Clone, Debug, Default)]
pub struct SessionContext {
    /// The logged-in user, if the cookie maps to a live session.
    pub user: Option<SessionUser>,
    /// Raw session token from the cookie, valid or not.
    pub token: Option<String>,
}

impl SessionContext {
    /// Whether the request carries a live session.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Who was let through the gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Caller {
    Session(String),
    ApiKey,
}

impl Caller {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Session(_) => "session",
            Self::ApiKey => "api_key",
        }
    }
}

/// Extract trace ID from X-Trace-Id header or generate a new one.
fn extract_or_generate_trace_id(req: &Request) -> TraceId {
    req.headers()
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(TraceId::from_client)
        .unwrap_or_else(TraceId::new)
}

/// Resolve the session cookie into a [`SessionContext`].
///
/// Unknown and expired tokens resolve to no user, as does a session whose
/// user is no longer in the credential store.
async fn resolve_session(state: &AppState, jar: &CookieJar) -> ApiResult<SessionContext> {
    let Some(cookie) = jar.get(&state.config.session.cookie_name) else {
        return Ok(SessionContext::default());
    };
    let token = cookie.value().to_string();

    let Some(username) = state.sessions.lookup(&token) else {
        return Ok(SessionContext {
            user: None,
            token: Some(token),
        });
    };

    if state.metadata.get_user(&username).await?.is_none() {
        tracing::warn!(username = %username, "Session refers to an unknown user, dropping it");
        state.sessions.remove(&token);
        return Ok(SessionContext {
            user: None,
            token: Some(token),
        });
    }

    Ok(SessionContext {
        user: Some(SessionUser { username }),
        token: Some(token),
    })
}

/// Middleware that assigns a trace ID and resolves the session cookie.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let trace_id = extract_or_generate_trace_id(&req);
    let trace_id_str = trace_id.0.clone();
    req.extensions_mut().insert(trace_id);

    let session = resolve_session(&state, &jar).await?;
    req.extensions_mut().insert(session);

    let response = next
        .run(req)
        .instrument(tracing::info_span!("request", trace_id = %trace_id_str))
        .await;

    Ok(response)
}

/// What the request carried in the API key header.
#[derive(Debug, PartialEq, Eq)]
enum PresentedKey<'a> {
    /// No header, or only whitespace.
    Absent,
    Text(&'a str),
    /// Header bytes that are not visible ASCII. Still a presented key.
    Undecodable,
}

/// Read the API key header. Absent and blank headers both count as "no key".
fn presented_api_key(headers: &HeaderMap) -> PresentedKey<'_> {
    let Some(value) = headers.get(API_KEY_HEADER) else {
        return PresentedKey::Absent;
    };
    match value.to_str().map(str::trim) {
        Ok("") => PresentedKey::Absent,
        Ok(raw) => PresentedKey::Text(raw),
        Err(_) => PresentedKey::Undecodable,
    }
}

/// Admit a request holding either a valid API key or a live session.
///
/// A presented key must be valid: a bad key is refused even when the
/// request also carries a session.
pub async fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    session: &SessionContext,
) -> ApiResult<Caller> {
    let presented = presented_api_key(headers);
    if presented != PresentedKey::Absent {
        let accepted = match presented {
            PresentedKey::Text(raw) => match ApiKey::parse(raw) {
                Ok(key) => accounts::validate_key(state.metadata.as_ref(), &key).await?,
                Err(_) => false,
            },
            _ => false,
        };
        if !accepted {
            metrics::API_KEY_REJECTIONS.inc();
            tracing::warn!("Rejected request with invalid API key");
            return Err(ApiError::Unauthorized("Invalid API key".to_string()));
        }
        return Ok(Caller::ApiKey);
    }

    match &session.user {
        Some(user) => Ok(Caller::Session(user.username.clone())),
        None => Err(ApiError::Unauthorized("Unauthorized".to_string())),
    }
}

/// Gate for routes that are open unless `auth.protect_open_routes` is set.
pub async fn authorize_open_route(
    state: &AppState,
    headers: &HeaderMap,
    session: &SessionContext,
) -> ApiResult<Option<Caller>> {
    if !state.config.auth.protect_open_routes {
        return Ok(None);
    }
    authorize(state, headers, session).await.map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_trace_id_from_client_sanitizes() {
        let id = TraceId::from_client("abc\ndef\u{1b}[31m");
        assert_eq!(id.as_str(), "abcdef[31m");

        let long = "x".repeat(500);
        assert_eq!(TraceId::from_client(&long).as_str().len(), MAX_TRACE_ID_LEN);

        // Nothing printable left: fall back to a generated ID.
        let generated = TraceId::from_client("\n\t");
        assert!(Uuid::parse_str(generated.as_str()).is_ok());
    }

    #[test]
    fn test_presented_api_key_ignores_blank() {
        let mut headers = HeaderMap::new();
        assert_eq!(presented_api_key(&headers), PresentedKey::Absent);

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("   "));
        assert_eq!(presented_api_key(&headers), PresentedKey::Absent);

        headers.insert(API_KEY_HEADER, HeaderValue::from_static(" k3y "));
        assert_eq!(presented_api_key(&headers), PresentedKey::Text("k3y"));
    }

    #[test]
    fn test_presented_api_key_undecodable_is_not_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_bytes(b"\xffbogus").unwrap(),
        );
        assert_eq!(presented_api_key(&headers), PresentedKey::Undecodable);
    }

    #[test]
    fn test_caller_kind() {
        assert_eq!(Caller::Session("admin".to_string()).kind(), "session");
        assert_eq!(Caller::ApiKey.kind(), "api_key");
    }
}
