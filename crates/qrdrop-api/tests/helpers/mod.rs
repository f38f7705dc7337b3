//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p qrdrop-api`. Everything runs
//! against a local storage backend rooted in a temporary directory.

#![allow(dead_code)]

pub mod fixtures;
pub mod storage;

use axum_test::TestServer;
use qrdrop_api::setup::routes;
use qrdrop_api::{AppState, QrCodeRenderer};
use qrdrop_core::{BaseConfig, Config, ExtensionPolicy, StorageBackend, StorageConfig};
use qrdrop_storage::{LocalStorage, Storage};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_SIGNING_KEY: &str = "test-signing-key-0123456789";
pub const TEST_STORAGE_URL: &str = "http://localhost:5000/files";

/// Test application: server and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub config: Arc<Config>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Root of the local "remote" object store.
    pub fn storage_root(&self) -> PathBuf {
        self._temp_dir.path().join("store")
    }

    pub fn upload_folder(&self) -> &std::path::Path {
        &self.config.upload_folder
    }

    pub fn qrcode_folder(&self) -> &std::path::Path {
        &self.config.qrcode_folder
    }
}

/// Configuration pointing every directory into `root`.
pub fn test_config(root: &std::path::Path) -> Config {
    Config {
        base: BaseConfig {
            host: "127.0.0.1".to_string(),
            server_port: 0,
            debug: true,
            environment: "test".to_string(),
            public_base_url: None,
        },
        storage: StorageConfig {
            backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: Some(root.join("store").to_string_lossy().to_string()),
            local_storage_base_url: Some(TEST_STORAGE_URL.to_string()),
            local_signing_key: Some(TEST_SIGNING_KEY.to_string()),
            upload_token_ttl_secs: 3600,
            private_url_ttl_secs: 3600,
        },
        upload_folder: root.join("uploads"),
        qrcode_folder: root.join("qrcodes"),
        max_content_length: 1024 * 1024,
        extensions: ExtensionPolicy::default(),
        rollback_orphaned_media: true,
    }
}

pub async fn local_storage(config: &Config) -> LocalStorage {
    LocalStorage::new(
        config
            .storage
            .local_storage_path
            .clone()
            .expect("local storage path"),
        TEST_STORAGE_URL.to_string(),
        TEST_SIGNING_KEY.as_bytes(),
    )
    .await
    .expect("Failed to create local storage")
}

/// Setup test app with local storage.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|config| config, plain_storage).await
}

pub fn plain_storage(storage: LocalStorage) -> Arc<dyn Storage> {
    Arc::new(storage)
}

/// Storage whose uploads under `prefix` fail.
pub fn failing_uploads(prefix: &'static str) -> impl FnOnce(LocalStorage) -> Arc<dyn Storage> {
    move |storage| Arc::new(storage::FlakyStorage::new(storage, prefix))
}

/// Setup test app with a tweaked configuration and a wrapped storage.
pub async fn setup_test_app_with<C, S>(tweak: C, wrap: S) -> TestApp
where
    C: FnOnce(Config) -> Config,
    S: FnOnce(LocalStorage) -> Arc<dyn Storage>,
{
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = tweak(test_config(temp_dir.path()));

    for dir in [&config.upload_folder, &config.qrcode_folder] {
        std::fs::create_dir_all(dir).expect("Failed to create scratch directory");
    }

    let storage = wrap(local_storage(&config).await);
    let config = Arc::new(config);
    let state = Arc::new(AppState::new(
        config.clone(),
        storage,
        Arc::new(QrCodeRenderer::default()),
    ));

    let app = routes::setup_routes(&config, state);
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        config,
        _temp_dir: temp_dir,
    }
}

/// Number of regular files below `dir`, recursively. Missing dirs count as empty.
pub fn count_files(dir: &std::path::Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(Result::ok)
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}
