//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p convertly-api --test api_test`.
//! Every test app gets its own temporary output, upload and public
//! directories.

pub mod fixtures;

use std::path::PathBuf;
use std::sync::Arc;

use axum_test::TestServer;
use convertly_api::setup::{routes, services};
use convertly_api::state::AppState;
use convertly_core::Config;
use tempfile::TempDir;

/// Test application: server, state, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn output_dir(&self) -> PathBuf {
        self.state.config.output_dir.clone()
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.state.config.upload_dir.clone()
    }

    /// Names of the files currently in a directory, sorted.
    pub fn files_in(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

pub fn create_test_config(root: &std::path::Path) -> Config {
    Config {
        output_dir: root.join("converted"),
        upload_dir: root.join("uploads"),
        public_dir: root.join("public"),
        ..Config::default()
    }
}

/// Setup test app with default limits.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup test app, letting the caller adjust the configuration first.
pub async fn setup_test_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let mut config = create_test_config(temp_dir.path());
    configure(&mut config);

    std::fs::create_dir_all(&config.public_dir).expect("Failed to create public directory");
    std::fs::write(
        config.public_dir.join("index.html"),
        "<html><body>convertly</body></html>",
    )
    .expect("Failed to write index.html");

    let state = services::initialize_services(&config)
        .await
        .expect("Failed to initialize services");
    let router = routes::setup_routes(&config, state.clone());
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}
