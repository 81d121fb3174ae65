// src/serve/mod.rs

//! HTTP serving.
//!
//! - [`livereload`]: the reload notification channel and the browser client.
//! - [`dev`]: development server with live-reload injection (`watch`).
//! - [`deploy`]: plain static server on `$PORT` (`deploy`).

pub mod deploy;
pub mod dev;
pub mod livereload;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::errors::{AssetpipeError, Result};

pub use deploy::{DeployServer, deploy_router, resolve_port};
pub use dev::{DevServer, dev_router};
pub use livereload::{LIVERELOAD_PATH, ReloadChannel, ReloadEvent};

/// Bind `host:port`. Bind failures are fatal for the calling task.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .map_err(|e| AssetpipeError::Server(format!("binding {host}:{port}: {e}")))
}

/// Serve `router` on `listener` until the process is terminated.
pub async fn serve_forever(listener: TcpListener, router: Router, label: &str) -> Result<()> {
    let addr = listener
        .local_addr()
        .map_err(|e| AssetpipeError::Server(e.to_string()))?;
    info!("{label} listening on http://{addr}");
    axum::serve(listener, router)
        .await
        .map_err(|e| AssetpipeError::Server(format!("{label}: {e}")))
}
