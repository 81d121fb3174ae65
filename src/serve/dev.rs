// src/serve/dev.rs

//! Development server: serves the project root, injects the live-reload
//! client into HTML pages and pushes reload events over a WebSocket.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{debug, warn};

use crate::dag::{Task, TaskFuture};
use crate::engine::TaskContext;
use crate::serve::livereload::{LIVERELOAD_PATH, ReloadChannel, ReloadEvent, inject_client};
use crate::serve::{bind, serve_forever};

/// The `serve` task: runs the dev server until the process exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevServer;

impl Task for DevServer {
    fn run(&self, cx: TaskContext) -> TaskFuture {
        Box::pin(async move {
            let env = cx.env();
            let server = env.config().server();
            let listener = bind(&server.host, server.dev_port).await?;
            let router = dev_router(env.root().to_path_buf(), env.reload().clone());
            serve_forever(listener, router, "dev server").await
        })
    }
}

struct DevState {
    root: PathBuf,
    reload: ReloadChannel,
}

/// Router for the dev server rooted at `root`.
pub fn dev_router(root: PathBuf, reload: ReloadChannel) -> Router {
    Router::new()
        .route(LIVERELOAD_PATH, get(livereload_socket))
        .fallback(serve_file)
        .with_state(Arc::new(DevState { root, reload }))
}

async fn livereload_socket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<DevState>>,
) -> impl IntoResponse {
    let events = state.reload.subscribe();
    debug!(clients = state.reload.client_count(), "live-reload client subscribed");
    ws.on_upgrade(move |socket| forward_events(socket, events))
}

/// Push reload events to one browser until either side goes away.
async fn forward_events(mut socket: WebSocket, mut events: broadcast::Receiver<ReloadEvent>) {
    debug!("live-reload client connected");
    loop {
        tokio::select! {
            event = events.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "live-reload client lagged, forcing full reload");
                        ReloadEvent::Reload
                    }
                    Err(RecvError::Closed) => break,
                };
                let Ok(text) = serde_json::to_string(&event) else {
                    continue;
                };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    debug!("live-reload client disconnected");
}

async fn serve_file(State(state): State<Arc<DevState>>, req: Request) -> Response {
    let uri_path = req.uri().path();
    let Some(rel) = sanitize(uri_path) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let mut file = state.root.join(&rel);
    if tokio::fs::metadata(&file).await.map(|m| m.is_dir()).unwrap_or(false) {
        if uri_path.ends_with('/') {
            file.push("index.html");
        } else {
            // ServeDir redirects to the trailing-slash form.
            return serve_static(&state.root, req).await;
        }
    }

    if is_html(&file) {
        if let Ok(html) = tokio::fs::read_to_string(&file).await {
            return Html(inject_client(&html)).into_response();
        }
    }

    serve_static(&state.root, req).await
}

async fn serve_static(root: &Path, req: Request) -> Response {
    match ServeDir::new(root).oneshot(req).await {
        Ok(res) => res.map(Body::new).into_response(),
        Err(never) => match never {},
    }
}

/// Percent-decode a request path and turn it into a root-relative path,
/// rejecting anything that could escape the root.
fn sanitize(uri_path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(uri_path).ok()?;
    let mut out = PathBuf::new();
    for component in Path::new(decoded.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

fn is_html(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("html") | Some("htm")
    )
}
