//! HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// HTTP server bound to its listening socket.
///
/// Binding is separate from serving so a bind failure surfaces before any
/// other startup work is done.
pub struct WebServer {
    /// Bound listener.
    listener: TcpListener,
    /// Application state.
    app_state: Arc<AppState>,
}

impl WebServer {
    /// Bind the listening socket described by `config`.
    pub async fn bind(config: &ServerConfig, app_state: Arc<AppState>) -> std::io::Result<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
        Ok(Self {
            listener,
            app_state,
        })
    }

    /// Address actually bound, useful when the port is 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    fn router(app_state: Arc<AppState>) -> Router {
        create_router(app_state).merge(create_health_router())
    }

    /// Serve requests until the process exits.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let local_addr = self.listener.local_addr()?;
        let router = Self::router(self.app_state);

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(self.listener, router).await
    }

    /// Serve requests on a background task and return the bound address.
    pub async fn run_with_addr(self) -> Result<SocketAddr, std::io::Error> {
        let local_addr = self.listener.local_addr()?;
        let router = Self::router(self.app_state);

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(self.listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
