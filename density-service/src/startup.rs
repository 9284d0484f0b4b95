use crate::config::{DensityConfig, HistoryBackend};
use crate::handlers;
use crate::services::{
    AnalysisService, DenyAllVerifier, HistoryStore, IdentityVerifier, ImageStore,
    InMemoryHistoryStore, JwtVerifier, LocalImageStore, MongoHistoryStore, ReportService,
    StaticTokenVerifier,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{request_id_middleware, request_span};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub analysis: AnalysisService,
    pub reports: ReportService,
    pub history: Arc<dyn HistoryStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

/// External collaborators the application is wired with.
#[derive(Clone)]
pub struct Dependencies {
    pub images: Arc<dyn ImageStore>,
    pub history: Arc<dyn HistoryStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl Dependencies {
    pub async fn from_config(config: &DensityConfig) -> Result<Self, AppError> {
        let history: Arc<dyn HistoryStore> = match config.history.backend {
            HistoryBackend::Memory => {
                tracing::warn!("Using in-memory history; results are lost on restart");
                Arc::new(InMemoryHistoryStore::new())
            }
            HistoryBackend::Mongo => {
                let uri = config.history.mongodb_uri.as_deref().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "MONGODB_URI is required for the mongo history backend"
                    ))
                })?;
                let store = MongoHistoryStore::connect(uri, &config.history.mongodb_database)
                    .await?;
                store.initialize_indexes().await.map_err(|e| {
                    tracing::error!("Failed to initialize database indexes: {}", e);
                    e
                })?;
                Arc::new(store)
            }
        };

        let images: Arc<dyn ImageStore> = Arc::new(
            LocalImageStore::new(&config.storage.local_path)
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Failed to initialize local storage at {}: {}",
                        config.storage.local_path,
                        e
                    );
                    e
                })?,
        );

        Ok(Self {
            images,
            history,
            verifier: verifier_from_config(config),
        })
    }
}

fn verifier_from_config(config: &DensityConfig) -> Arc<dyn IdentityVerifier> {
    if config.auth.debug_auth {
        let tokens = StaticTokenVerifier::from_pairs(
            config.auth.debug_tokens.as_deref().unwrap_or_default(),
        );
        tracing::warn!(tokens = tokens.len(), "Debug authentication enabled");
        return Arc::new(tokens);
    }

    match config.auth.jwt_secret.as_deref() {
        Some(secret) if !secret.is_empty() => Arc::new(JwtVerifier::new(secret)),
        _ => {
            tracing::warn!("No identity verifier configured; all requests will be rejected");
            Arc::new(DenyAllVerifier)
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/api/v1/photos/analyze", post(handlers::analyze_photo))
        .route("/api/v1/reports/generate", post(handlers::generate_report))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(config: DensityConfig) -> Result<Self, AppError> {
        let deps = Dependencies::from_config(&config).await?;
        Self::build_with(config, deps).await
    }

    pub async fn build_with(config: DensityConfig, deps: Dependencies) -> Result<Self, AppError> {
        let state = AppState {
            analysis: AnalysisService::new(
                deps.images,
                deps.history.clone(),
                config.analysis.max_image_bytes,
            ),
            reports: ReportService::new(deps.history.clone()),
            history: deps.history,
            verifier: deps.verifier,
        };

        let app = router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
