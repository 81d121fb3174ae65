// src/serve/livereload.rs

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::pipeline::sources::slash_path;

/// WebSocket endpoint the injected client connects to.
pub const LIVERELOAD_PATH: &str = "/__livereload";

/// Messages pushed to connected browsers, serialized as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadEvent {
    /// Reload the whole page.
    Reload,
    /// Refresh the given URL paths in place where possible.
    Refresh { paths: Vec<String> },
}

/// Handle to the process-wide live-reload broadcaster.
///
/// Created once at startup and passed to whatever needs to emit or receive
/// reload events. Sending with no connected clients is a no-op.
#[derive(Debug, Clone)]
pub struct ReloadChannel {
    tx: broadcast::Sender<ReloadEvent>,
}

impl Default for ReloadChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadChannel {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers (connected browsers, or test receivers).
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn reload_page(&self) {
        self.send(ReloadEvent::Reload);
    }

    /// Announce changed files under `root` as URL paths.
    pub fn refresh_files(&self, root: &Path, files: &[PathBuf]) {
        let paths: Vec<String> = files.iter().filter_map(|f| url_path(root, f)).collect();
        if paths.is_empty() {
            return;
        }
        self.send(ReloadEvent::Refresh { paths });
    }

    fn send(&self, event: ReloadEvent) {
        match self.tx.send(event) {
            Ok(clients) => debug!(clients, "sent live-reload event"),
            Err(_) => debug!("no live-reload clients connected"),
        }
    }
}

/// URL path (`/static/css/site.css`) of a file under `root`.
pub fn url_path(root: &Path, file: &Path) -> Option<String> {
    slash_path(root, file).map(|rel| format!("/{rel}"))
}

/// Browser side of live reload.
pub const CLIENT_SCRIPT: &str = r#"(function () {
  var proto = location.protocol === "https:" ? "wss:" : "ws:";
  var socket = new WebSocket(proto + "//" + location.host + "/__livereload");
  function bust(url) {
    var u = new URL(url, location.href);
    u.searchParams.set("livereload", Date.now());
    return u.toString();
  }
  function sameFile(url, path) {
    return new URL(url, location.href).pathname === path;
  }
  function refresh(paths) {
    var full = false;
    paths.forEach(function (path) {
      if (/\.css$/.test(path)) {
        document.querySelectorAll('link[rel="stylesheet"]').forEach(function (link) {
          if (sameFile(link.href, path)) link.href = bust(link.href);
        });
      } else if (/\.(png|jpe?g|gif|svg)$/.test(path)) {
        document.querySelectorAll("img").forEach(function (img) {
          if (sameFile(img.src, path)) img.src = bust(img.src);
        });
      } else {
        full = true;
      }
    });
    if (full) location.reload();
  }
  socket.onmessage = function (msg) {
    var event = JSON.parse(msg.data);
    if (event.type === "reload") location.reload();
    else if (event.type === "refresh") refresh(event.paths);
  };
})();"#;

static BODY_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</body\s*>").expect("static regex"));

/// Inject the live-reload client before the last `</body>`, or append it
/// when the document has none.
pub fn inject_client(html: &str) -> String {
    let snippet = format!("<script>{CLIENT_SCRIPT}</script>\n");
    match BODY_CLOSE.find_iter(html).last() {
        Some(m) => {
            let mut out = String::with_capacity(html.len() + snippet.len());
            out.push_str(&html[..m.start()]);
            out.push_str(&snippet);
            out.push_str(&html[m.start()..]);
            out
        }
        None => format!("{html}{snippet}"),
    }
}
