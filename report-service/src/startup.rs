//! Application startup and lifecycle management.

use crate::config::{ProviderKind, ReportConfig};
use crate::handlers;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::mock::MockTextProvider;
use crate::services::providers::TextProvider;
use crate::services::ReportAnalyzer;
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{make_request_span, request_id_middleware};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ReportConfig,
    pub analyzer: Arc<ReportAnalyzer>,
    pub provider: Arc<dyn TextProvider>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the provider selected by configuration.
    pub async fn build(config: ReportConfig) -> Result<Self, AppError> {
        let provider = build_provider(&config)?;
        Self::build_with_provider(config, provider).await
    }

    /// Build the application around an already constructed provider.
    pub async fn build_with_provider(
        config: ReportConfig,
        provider: Arc<dyn TextProvider>,
    ) -> Result<Self, AppError> {
        let analyzer = Arc::new(ReportAnalyzer::new(
            provider.clone(),
            config.models.text_model.clone(),
        ));

        let addr = config.common.socket_addr();
        let state = AppState {
            config,
            analyzer,
            provider,
        };

        // Port 0 binds a random port for testing
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            model = %state.config.models.text_model,
            "Report service listening"
        );

        Ok(Self {
            port,
            listener,
            router: router(state),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Service shutdown complete");
        Ok(())
    }
}

/// Build the HTTP router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    let max_body_bytes = state.config.http.max_body_bytes;
    let cors = cors_layer(&state.config.http.allowed_origins);

    Router::new()
        .route("/", get(handlers::root))
        .route("/analyzeReport", post(handlers::analyze_report))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        // Outside the trace layer so spans see the id
        .layer(from_fn(request_id_middleware))
        .layer(cors)
}

/// Construct the provider named by `GENAI_PROVIDER`.
pub fn build_provider(config: &ReportConfig) -> Result<Arc<dyn TextProvider>, AppError> {
    match config.models.provider {
        ProviderKind::Gemini => {
            let provider = GeminiTextProvider::new(GeminiConfig {
                api_key: config.google.api_key.clone(),
                base_url: config.google.api_base.clone(),
                timeout: config.upstream.timeout(),
            })
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

            tracing::info!(
                model = %config.models.text_model,
                base_url = %config.google.api_base,
                "Initialized Gemini text provider"
            );
            Ok(Arc::new(provider))
        }
        ProviderKind::Mock => {
            tracing::warn!("Using mock text provider; replies are canned");
            Ok(Arc::new(MockTextProvider::offline()))
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins = allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                None
            }
        })
        .collect::<Vec<HeaderValue>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
