#![allow(dead_code)]

use report_service::config::{
    GoogleConfig, HttpConfig, ModelConfig, ProviderKind, ReportConfig, UpstreamConfig,
};
use report_service::services::providers::gemini::GEMINI_API_BASE;
use report_service::services::providers::TextProvider;
use report_service::startup::Application;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

pub const TEST_MODEL: &str = "gemini-2.0-flash";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

/// Configuration bound to a random local port, independent of the
/// process environment.
pub fn test_config() -> ReportConfig {
    ReportConfig {
        common: CoreConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
        },
        models: ModelConfig {
            text_model: TEST_MODEL.to_string(),
            provider: ProviderKind::Mock,
        },
        google: GoogleConfig {
            api_key: Secret::new("test-api-key".to_string()),
            api_base: GEMINI_API_BASE.to_string(),
        },
        upstream: UpstreamConfig { timeout_secs: 5 },
        http: HttpConfig::default(),
    }
}

impl TestApp {
    pub async fn spawn_with(provider: Arc<dyn TextProvider>) -> Self {
        Self::spawn_with_config(test_config(), provider).await
    }

    pub async fn spawn_with_config(config: ReportConfig, provider: Arc<dyn TextProvider>) -> Self {
        let app = Application::build_with_provider(config, provider)
            .await
            .expect("Failed to build test application");
        Self::serve(app).await
    }

    /// Spawn using the provider selected by `config`.
    pub async fn spawn_from_config(config: ReportConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        Self::serve(app).await
    }

    async fn serve(app: Application) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    pub async fn post_analyze(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/analyzeReport", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to send request")
    }
}
