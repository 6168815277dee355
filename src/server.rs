//! HTTP Server
//!
//! Axum server with open CORS, request tracing and graceful shutdown.

use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::agent::CareerAgents;
use crate::api::{api_router, AppState};
use crate::config::Config;
use crate::groq::GroqClient;
use crate::search::TavilyClient;
use crate::store::PathfinderStore;

/// Career Pathfinder server
pub struct PathfinderServer {
    config: Config,
    state: Arc<AppState>,
}

impl PathfinderServer {
    pub fn new(config: Config, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Wire store, model client and agents from config
    pub fn from_config(config: Config) -> Result<Self> {
        let store = PathfinderStore::open(&config.db_path)?;

        let mut groq = GroqClient::from_config(&config);
        if !groq.is_available() {
            warn!("GROQ_API_KEY not set - every agent call will return its fallback");
        }

        let tavily = TavilyClient::from_config(&config);
        if tavily.is_available() {
            groq = groq.with_search(Arc::new(tavily));
        } else {
            warn!("TAVILY_API_KEY not set - tracks and roadmaps are generated without web search");
        }

        let agents = CareerAgents::from_config(&config, Arc::new(groq));

        let resume_context = config.load_resume();
        if resume_context.is_some() {
            info!("Resume loaded from {}", config.resume_path.display());
        }

        let state = Arc::new(AppState::new(store, agents, resume_context));
        Ok(Self::new(config, state))
    }

    /// Build the router with all routes and middleware
    pub fn build_router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        api_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Start the server and run until shutdown signal
    pub async fn run(self) -> Result<()> {
        let addr = self.config.listen_addr();
        let router = self.build_router();

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Career Pathfinder listening on http://{}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server shut down gracefully");
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
