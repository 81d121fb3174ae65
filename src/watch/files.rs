// src/watch/files.rs

use std::time::Duration;

use tokio::sync::mpsc;

use crate::dag::{Task, TaskFuture};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, TaskContext};
use crate::watch::patterns::{build_watch_bindings, default_watch_specs};
use crate::watch::watcher::spawn_watcher;

/// The `watch-files` task: watches sources and re-runs `css` / `js` or
/// reloads the page. Never completes on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchFiles;

impl Task for WatchFiles {
    fn run(&self, cx: TaskContext) -> TaskFuture {
        Box::pin(async move {
            let env = cx.env();
            let bindings = build_watch_bindings(&default_watch_specs())?;
            let actions = bindings.iter().map(|b| b.action().clone()).collect();

            let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
            let _watcher = spawn_watcher(env.root(), bindings, tx.clone())?;

            let delay = Duration::from_millis(env.config().watch().delay_ms);
            Runtime::new(CoreRuntime::new(actions), rx, tx, cx.runner().clone(), delay)
                .run()
                .await
        })
    }
}
