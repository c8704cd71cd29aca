//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, timeout, CORS, access log)
//! - Own the session store and spawn its sweeper
//! - Serve over a plain listener or terminate TLS

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch},
    Extension, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{CorsConfig, CounterConfig};
use crate::counter::CounterService;
use crate::forwarded::TransportSecurity;
use crate::http::handlers;
use crate::http::middleware::access_log_middleware;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::Shutdown;
use crate::session::{CookiePolicy, SessionStore, SessionSweeper};

/// Error type for serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid listen address '{0}': {1}")]
    Address(String, std::net::AddrParseError),

    #[error("TLS setup failed: {0}")]
    Tls(std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub counter: CounterService,
    pub cookies: Arc<CookiePolicy>,
}

/// HTTP server for the counter API.
pub struct HttpServer {
    router: Router,
    config: CounterConfig,
    sessions: Arc<SessionStore>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: CounterConfig) -> Self {
        let sessions = Arc::new(SessionStore::new(config.session.ttl()));
        let state = AppState {
            counter: CounterService::new(sessions.clone()),
            cookies: Arc::new(CookiePolicy::from_config(&config)),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            sessions,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &CounterConfig, state: AppState) -> Router {
        // Each counter route also answers with a trailing slash; browser
        // clients address the read endpoint as `<path>/`.
        let base = config.session.path.trim_end_matches('/');
        let mut counter_routes = Router::new()
            .route(&format!("{}/", base), get(handlers::get_count))
            .route(&format!("{}/up", base), patch(handlers::increment))
            .route(&format!("{}/up/", base), patch(handlers::increment))
            .route(&format!("{}/down", base), patch(handlers::decrement))
            .route(&format!("{}/down/", base), patch(handlers::decrement));
        if !base.is_empty() {
            counter_routes = counter_routes.route(base, get(handlers::get_count));
        }
        let counter_routes =
            counter_routes.route_layer(middleware::from_fn(access_log_middleware));

        let router = Router::new()
            .merge(counter_routes)
            .route("/health", get(handlers::health))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http());

        match cors_layer(&config.cors) {
            Some(cors) => router.layer(cors),
            None => router,
        }
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        self.spawn_sweeper(&shutdown);

        let app = self
            .router
            .layer(Extension(TransportSecurity::Plain))
            .into_make_service_with_connect_info::<SocketAddr>();

        let mut stop = shutdown.subscribe();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Terminate TLS on `addr` and serve until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: Shutdown,
    ) -> Result<(), ServerError> {
        tracing::info!(address = %addr, "HTTPS server starting");

        self.spawn_sweeper(&shutdown);

        let handle = axum_server::Handle::new();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        let mut stop = shutdown.subscribe();
        let stopper = handle.clone();
        tokio::spawn(async move {
            let _ = stop.recv().await;
            stopper.graceful_shutdown(Some(grace));
        });

        let app = self
            .router
            .layer(Extension(TransportSecurity::Encrypted))
            .into_make_service_with_connect_info::<SocketAddr>();

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app)
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// Session store backing this server.
    pub fn sessions(&self) -> Arc<SessionStore> {
        self.sessions.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    fn spawn_sweeper(&self, shutdown: &Shutdown) {
        let sweeper = SessionSweeper::new(self.sessions.clone(), self.config.session.sweep_interval());
        tokio::spawn(sweeper.run(shutdown.subscribe()));
    }
}

/// Credentialed CORS for the single configured UI origin.
fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    let origin = config.allow_origin.as_deref()?;
    let origin = match HeaderValue::from_str(origin) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(origin, error = %e, "Ignoring unusable CORS origin");
            return None;
        }
    };

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::PATCH, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]),
    )
}
