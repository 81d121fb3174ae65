// src/watch/watcher.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::errors::{AssetpipeError, Result};
use crate::pipeline::sources::slash_path;
use crate::watch::patterns::WatchBinding;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher over the base directories of `bindings` and
/// send `RuntimeEvent::PathChanged` for every binding a changed path
/// matches. Binding ids are indices into `bindings`.
///
/// Base directories that do not exist yet are skipped with a warning.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    bindings: Vec<WatchBinding>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or(root);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

    // Called synchronously on notify's thread.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            let _ = event_tx.send(res);
        },
        Config::default(),
    )
    .map_err(watch_error)?;

    for (dir, recursive) in watch_dirs(&bindings) {
        let path = root.join(&dir);
        if !path.is_dir() {
            warn!(?path, "watch directory does not exist, skipping");
            continue;
        }
        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(&path, mode).map_err(watch_error)?;
        debug!(?path, recursive, "watching directory");
    }

    info!("file watcher started on {:?}", root);

    let bindings = Arc::new(bindings);
    tokio::spawn(async move {
        while let Some(res) = event_rx.recv().await {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    warn!("file watch error: {err}");
                    continue;
                }
            };
            if matches!(event.kind, EventKind::Access(_)) {
                continue;
            }
            debug!("received notify event: {:?}", event);

            for path in &event.paths {
                let Some(rel) = slash_path(&root, path) else {
                    warn!("could not relativize path {:?} against root {:?}", path, root);
                    continue;
                };
                for (binding, b) in bindings.iter().enumerate() {
                    if !b.matches(&rel) {
                        continue;
                    }
                    debug!(binding, path = %rel, "watch match");
                    let sent = runtime_tx
                        .send(RuntimeEvent::PathChanged {
                            binding,
                            path: rel.clone(),
                        })
                        .await;
                    if sent.is_err() {
                        debug!("runtime channel closed, stopping watcher loop");
                        return;
                    }
                }
            }
        }

        debug!("file watcher loop ended");
    });

    Ok(WatcherHandle { _inner: watcher })
}

/// Distinct directories to watch; a directory wanted both ways is watched
/// recursively.
fn watch_dirs(bindings: &[WatchBinding]) -> BTreeMap<String, bool> {
    let mut dirs: BTreeMap<String, bool> = BTreeMap::new();
    for base in bindings.iter().flat_map(|b| b.bases()) {
        *dirs.entry(base.dir.clone()).or_default() |= base.recursive;
    }
    dirs
}

fn watch_error(err: notify::Error) -> AssetpipeError {
    AssetpipeError::Other(anyhow::Error::new(err).context("starting file watcher"))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::watch::patterns::{build_watch_bindings, default_watch_specs};

    #[test]
    fn watch_dirs_are_deduplicated() {
        let bindings = build_watch_bindings(&default_watch_specs()).unwrap();
        let dirs = watch_dirs(&bindings);
        let expected: BTreeMap<String, bool> = [
            (String::new(), false),
            ("static/js".to_string(), true),
            ("static/scss".to_string(), true),
        ]
        .into_iter()
        .collect();
        assert_eq!(dirs, expected);
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = Path::new("/srv/site");
        assert_eq!(
            slash_path(root, Path::new("/srv/site/static/js/app.js")).as_deref(),
            Some("static/js/app.js")
        );
        assert_eq!(slash_path(root, Path::new("/elsewhere/x.js")), None);
    }
}
