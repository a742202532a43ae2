//! Login, registration and logout pages.

use crate::auth::SessionContext;
use crate::error::ApiResult;
use crate::pages;
use crate::session::{removal_cookie, session_cookie};
use crate::state::AppState;
use axum::extract::{Extension, Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use cfipd_core::Credentials;
use cfipd_metadata::{MetadataError, accounts};
use serde::Deserialize;

/// Fields posted by the login and register forms.
///
/// Missing fields deserialize as empty so they reach the usual validation.
#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

const LOGIN_FAILED: &str = "Invalid username or password";

/// GET /login - Render the login form.
pub async fn login_form(Extension(session): Extension<SessionContext>) -> Response {
    if session.is_authenticated() {
        return Redirect::to("/").into_response();
    }
    Html(pages::login_page(None)).into_response()
}

/// POST /login - Check credentials and start a session.
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> ApiResult<Response> {
    let user =
        accounts::authenticate(state.metadata.as_ref(), &form.username, &form.password).await?;

    let Some(user) = user else {
        tracing::warn!(username = %form.username.trim(), "Failed login attempt");
        return Ok((
            StatusCode::UNAUTHORIZED,
            Html(pages::login_page(Some(LOGIN_FAILED))),
        )
            .into_response());
    };

    // A fresh token on every login; the previous one stops working.
    if let Some(previous) = &session.token {
        state.sessions.remove(previous);
    }
    let token = state.sessions.create(&user.username);
    let jar = jar.add(session_cookie(&state.config.session, token));

    tracing::info!(username = %user.username, "User logged in");
    Ok((jar, Redirect::to("/")).into_response())
}

/// GET /register - Render the registration form while no account exists.
pub async fn register_form(State(state): State<AppState>) -> ApiResult<Response> {
    if state.metadata.has_users().await? {
        return Ok(Redirect::to("/login").into_response());
    }
    Ok(Html(pages::register_page(None)).into_response())
}

/// POST /register - Create the first and only account.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> ApiResult<Response> {
    if state.metadata.has_users().await? {
        return Ok(Redirect::to("/login").into_response());
    }

    let credentials = match Credentials::new(&form.username, &form.password) {
        Ok(credentials) => credentials,
        Err(e) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Html(pages::register_page(Some(&e.to_string()))),
            )
                .into_response());
        }
    };

    match accounts::register(state.metadata.as_ref(), &credentials).await {
        Ok(_) => Ok(Redirect::to("/login").into_response()),
        // Lost the race against a concurrent registration.
        Err(MetadataError::AlreadyExists(_)) => {
            tracing::warn!(username = %credentials.username, "Registration closed");
            Ok(Redirect::to("/login").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /logout - End the session and clear the cookie.
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    jar: CookieJar,
) -> Response {
    if let Some(token) = &session.token {
        state.sessions.remove(token);
    }
    if let Some(user) = &session.user {
        tracing::info!(username = %user.username, "User logged out");
    }

    let jar = jar.remove(removal_cookie(&state.config.session));
    (jar, Redirect::to("/login")).into_response()
}
