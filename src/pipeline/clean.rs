// src/pipeline/clean.rs

use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::dag::{Task, TaskFuture};
use crate::engine::TaskContext;
use crate::errors::Result;

/// Deletes the whole output tree. No confirmation, no dry run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clean;

impl Task for Clean {
    fn run(&self, cx: TaskContext) -> TaskFuture {
        Box::pin(async move { remove_tree(&cx.env().output_dir()).await })
    }
}

/// Remove `dir` recursively. An already-absent directory counts as success.
pub async fn remove_tree(dir: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {
            info!(?dir, "removed output directory");
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(?dir, "output directory already absent");
            Ok(())
        }
        Err(err) => Err(anyhow::Error::new(err)
            .context(format!("removing {:?}", dir))
            .into()),
    }
}
