//! Server test utilities.

use super::http::{body_json, empty_request, form_request, send, set_cookie_pair};
use axum::http::StatusCode;
use cfipd_core::config::AppConfig;
use cfipd_server::{AppState, create_router};
use std::path::PathBuf;
use tempfile::TempDir;

pub const TEST_USERNAME: &str = "admin";
pub const TEST_PASSWORD: &str = "correct-horse";

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let mut config = AppConfig::for_testing(temp_dir.path());
        modifier(&mut config);

        cfipd_server::metrics::register_metrics();

        let slot = cfipd_storage::from_config(&config.storage)
            .await
            .expect("Failed to create slot storage");
        let metadata = cfipd_metadata::from_config(&config.metadata)
            .await
            .expect("Failed to create credential stores");

        let state = AppState::new(config, slot, metadata);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Directory holding the slot.
    pub fn storage_dir(&self) -> PathBuf {
        self.state.config.storage.path.clone()
    }

    /// Names of the files currently on disk in the slot, sorted.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.storage_dir())
            .expect("Failed to read storage directory")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }

    /// Register the test user.
    pub async fn register(&self) {
        let response = send(
            &self.router,
            form_request(
                "/register",
                &[("username", TEST_USERNAME), ("password", TEST_PASSWORD)],
                None,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    /// Log in as the test user and return the `Cookie` header value.
    pub async fn login(&self) -> String {
        let response = send(
            &self.router,
            form_request(
                "/login",
                &[("username", TEST_USERNAME), ("password", TEST_PASSWORD)],
                None,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        set_cookie_pair(&response).expect("login did not set a session cookie")
    }

    /// Register the test user and log in.
    pub async fn register_and_login(&self) -> String {
        self.register().await;
        self.login().await
    }

    /// Issue an API key through the HTTP surface.
    pub async fn issue_api_key(&self, cookie: Option<&str>) -> String {
        let response = send(
            &self.router,
            empty_request("POST", "/generate-api-key", cookie),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["api_key"]
            .as_str()
            .expect("response carries no api_key")
            .to_string()
    }
}
