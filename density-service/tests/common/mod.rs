#![allow(dead_code)]

use density_service::config::{
    AnalysisConfig, AuthConfig, DensityConfig, HistoryBackend, HistoryConfig, StorageConfig,
};
use density_service::services::{InMemoryHistoryStore, InMemoryImageStore, StaticTokenVerifier};
use density_service::startup::{Application, Dependencies};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use service_core::config::Config as CoreConfig;
use std::io::Cursor;
use std::sync::Arc;

pub const TEST_TOKEN: &str = "test-token";
pub const TEST_SUBJECT: &str = "test_user_123";
pub const OTHER_TOKEN: &str = "other-token";
pub const OTHER_SUBJECT: &str = "other_user_456";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub images: Arc<InMemoryImageStore>,
    pub history: Arc<InMemoryHistoryStore>,
    pub client: reqwest::Client,
}

fn test_config() -> DensityConfig {
    DensityConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            ..CoreConfig::default()
        },
        history: HistoryConfig {
            backend: HistoryBackend::Memory,
            mongodb_uri: None,
            mongodb_database: "density_test".to_string(),
        },
        storage: StorageConfig {
            local_path: "unused".to_string(),
        },
        auth: AuthConfig {
            jwt_secret: None,
            debug_auth: true,
            debug_tokens: None,
        },
        analysis: AnalysisConfig {
            max_image_bytes: 1024 * 1024,
        },
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let images = Arc::new(InMemoryImageStore::new());
        let history = Arc::new(InMemoryHistoryStore::new());
        let deps = Dependencies {
            images: images.clone(),
            history: history.clone(),
            verifier: Arc::new(StaticTokenVerifier::new([
                (TEST_TOKEN, TEST_SUBJECT),
                (OTHER_TOKEN, OTHER_SUBJECT),
            ])),
        };

        let app = Application::build_with(test_config(), deps)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            images,
            history,
            client,
        }
    }

    pub async fn analyze(&self, token: Option<&str>, body: serde_json::Value) -> reqwest::Response {
        let mut request = self
            .client
            .post(format!("{}/api/v1/photos/analyze", self.address))
            .json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn generate_report(
        &self,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> reqwest::Response {
        let mut request = self
            .client
            .post(format!("{}/api/v1/reports/generate", self.address))
            .json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request")
    }
}

/// Image whose left `dark_share` of columns is dark hair-like tone and the rest light
/// scalp-like tone.
pub fn split_png(width: u32, height: u32, dark_share: f64) -> Vec<u8> {
    let boundary = (width as f64 * dark_share).round() as u32;
    let image = RgbImage::from_fn(width, height, |x, _| {
        if x < boundary {
            Rgb([30, 24, 20])
        } else {
            Rgb([215, 190, 170])
        }
    });
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("Failed to encode test image");
    buffer.into_inner()
}
