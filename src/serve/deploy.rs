// src/serve/deploy.rs

//! Plain static file server used by `deploy`. No live reload.

use std::path::PathBuf;

use axum::Router;
use tower_http::services::ServeDir;
use tracing::debug;

use crate::config::ServerSection;
use crate::dag::{Task, TaskFuture};
use crate::engine::TaskContext;
use crate::errors::{AssetpipeError, Result};
use crate::serve::{bind, serve_forever};

/// Environment variable overriding the deploy port.
pub const PORT_ENV_VAR: &str = "PORT";

/// Reads one environment variable.
pub type EnvLookup = fn(&str) -> Option<String>;

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// The `start-server` task.
#[derive(Debug, Clone, Copy)]
pub struct DeployServer {
    lookup: EnvLookup,
}

impl Default for DeployServer {
    fn default() -> Self {
        Self::with_env(process_env)
    }
}

impl DeployServer {
    /// Resolve `PORT` through `lookup` instead of the process environment.
    pub fn with_env(lookup: EnvLookup) -> Self {
        Self { lookup }
    }

    /// Port to listen on: `PORT` when set, else `[server].deploy_port`.
    pub fn port(&self, server: &ServerSection) -> Result<u16> {
        resolve_port((self.lookup)(PORT_ENV_VAR).as_deref(), server.deploy_port)
    }
}

impl Task for DeployServer {
    fn run(&self, cx: TaskContext) -> TaskFuture {
        let this = *self;
        Box::pin(async move {
            let env = cx.env();
            let server = env.config().server();
            let port = this.port(server)?;
            let listener = bind(&server.host, port).await?;
            serve_forever(listener, deploy_router(env.root().to_path_buf()), "static server").await
        })
    }
}

/// Pick the deploy port: `PORT` when set, otherwise `default`.
pub fn resolve_port(env_value: Option<&str>, default: u16) -> Result<u16> {
    match env_value.map(str::trim) {
        None | Some("") => Ok(default),
        Some(raw) => {
            let port = raw.parse::<u16>().map_err(|e| {
                AssetpipeError::ConfigError(format!("invalid {PORT_ENV_VAR} value '{raw}': {e}"))
            })?;
            debug!(port, "deploy port taken from environment");
            Ok(port)
        }
    }
}

/// Router serving `root` verbatim.
pub fn deploy_router(root: PathBuf) -> Router {
    Router::new().fallback_service(ServeDir::new(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_env_overrides_default() {
        assert_eq!(resolve_port(Some("8080"), 5000).unwrap(), 8080);
    }

    #[test]
    fn missing_or_blank_port_uses_default() {
        assert_eq!(resolve_port(None, 5000).unwrap(), 5000);
        assert_eq!(resolve_port(Some("  "), 5000).unwrap(), 5000);
    }

    #[test]
    fn deploy_server_reads_port_variable() {
        let server = ServerSection::default();
        let from_env = DeployServer::with_env(|key| (key == "PORT").then(|| "8080".to_string()));
        assert_eq!(from_env.port(&server).unwrap(), 8080);

        let unset = DeployServer::with_env(|_| None);
        assert_eq!(unset.port(&server).unwrap(), 5000);
    }

    #[test]
    fn garbage_port_is_a_config_error() {
        assert!(matches!(
            resolve_port(Some("http"), 5000),
            Err(AssetpipeError::ConfigError(_))
        ));
        assert!(resolve_port(Some("70000"), 5000).is_err());
    }
}
