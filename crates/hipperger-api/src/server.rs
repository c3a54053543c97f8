//! Main server implementation for the hipperger auth gateway

use crate::{
    api,
    api::auth::TokenGatekeeper,
    config::Config,
    error::{ApiError, Result},
    services::{Auth0Client, IdentityProvider, SignupService},
};
use axum::Router;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Main server structure
pub struct Server {
    config: Arc<Config>,
    app: Router,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    /// Exchanges credentials for access tokens
    pub identity_provider: Arc<dyn IdentityProvider>,

    /// Validates bearer tokens on protected routes
    pub gatekeeper: Arc<TokenGatekeeper>,

    /// Present only when local signup is enabled
    pub signup: Option<Arc<SignupService>>,
}

impl Server {
    /// Create a new server instance
    pub async fn new(config: Config) -> Result<Self> {
        info!("Initializing hipperger API server");

        config.validate()?;
        let config = Arc::new(config);

        let identity_provider = Auth0Client::new(config.auth0.clone()).map_err(|e| {
            ApiError::Internal {
                message: format!("Failed to create Auth0 client: {e}"),
            }
        })?;
        info!(
            "Forwarding logins to {}",
            identity_provider.token_endpoint()
        );

        let gatekeeper = TokenGatekeeper::from_config(&config.gatekeeper)?;
        info!(
            "Validating tokens for audience {} against {}",
            config.gatekeeper.audience,
            config.gatekeeper.jwks_uri()
        );

        let signup = if config.signup.enabled {
            let service = SignupService::from_config(&config.signup)
                .await
                .map_err(|e| ApiError::Internal {
                    message: format!("Failed to initialize signup store: {e}"),
                })?;
            info!("Local signup enabled");
            Some(Arc::new(service))
        } else {
            None
        };

        let state = AppState {
            config: config.clone(),
            identity_provider: Arc::new(identity_provider),
            gatekeeper: Arc::new(gatekeeper),
            signup,
        };

        let app = build_router(state);

        Ok(Self { config, app })
    }

    /// Run the server until shutdown signal
    pub async fn run(self) -> Result<()> {
        let addr = self.config.server.bind_address;

        info!("Starting HTTP server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::Internal {
                message: format!("Failed to bind to address {addr}: {e}"),
            })?;

        info!("hipperger API listening on {}", addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ApiError::Internal {
                message: format!("Server error: {e}"),
            })?;

        Ok(())
    }
}

/// Build the application router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout();

    let app = Router::new()
        .nest("/api/v1", api::routes(state.clone()))
        .merge(api::public_routes())
        .with_state(state);

    api::middleware::apply_middleware(app, request_timeout)
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            warn!("Received terminate signal, shutting down");
        },
    }
}
