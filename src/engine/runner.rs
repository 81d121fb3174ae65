// src/engine/runner.rs

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tracing::{error, info};

use crate::dag::{Entry, Registry, Target, TaskFuture};
use crate::errors::{AssetpipeError, Result};
use crate::pipeline::PipelineEnv;
use crate::serve::ReloadChannel;
use crate::types::TaskName;

/// Context handed to a running task.
///
/// Cheap to clone; gives access to the shared pipeline environment and to
/// the runner itself, so tasks like the watcher can re-run other tasks.
#[derive(Clone)]
pub struct TaskContext {
    name: TaskName,
    runner: Runner,
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl TaskContext {
    /// Name the task was invoked under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn env(&self) -> &PipelineEnv {
        self.runner.env()
    }

    pub fn reload(&self) -> &ReloadChannel {
        self.runner.env().reload()
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }
}

/// Executes registered tasks and composite targets.
#[derive(Clone)]
pub struct Runner {
    registry: Arc<Registry>,
    env: Arc<PipelineEnv>,
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("registry", &self.registry)
            .field("root", &self.env.root())
            .finish()
    }
}

impl Runner {
    /// Build a runner after validating the registry's reference graph.
    pub fn new(registry: Registry, env: PipelineEnv) -> Result<Self> {
        registry.validate()?;
        Ok(Self {
            registry: Arc::new(registry),
            env: Arc::new(env),
        })
    }

    pub fn env(&self) -> &PipelineEnv {
        &self.env
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run a registered task or target by name.
    pub async fn run(&self, name: &str) -> Result<()> {
        if !self.registry.contains(name) {
            return Err(AssetpipeError::TaskNotFound(name.to_string()));
        }
        self.run_target(Target::Ref(name.to_string())).await
    }

    /// Drive an arbitrary target tree.
    ///
    /// - `Series`: each step starts only after the previous one completed;
    ///   the first failure is returned and later steps never start.
    /// - `Parallel`: all members start at once; the first failure is
    ///   returned immediately, siblings keep running detached.
    pub fn run_target(&self, target: Target) -> TaskFuture {
        let runner = self.clone();
        Box::pin(async move {
            match target {
                Target::Ref(name) => runner.run_named(name).await,
                Target::Series(steps) => {
                    for step in steps {
                        runner.run_target(step).await?;
                    }
                    Ok(())
                }
                Target::Parallel(members) => {
                    let futures = members.into_iter().map(|m| runner.run_target(m)).collect();
                    join_all(futures).await
                }
            }
        })
    }

    async fn run_named(&self, name: TaskName) -> Result<()> {
        let entry = self
            .registry
            .get(&name)
            .cloned()
            .ok_or_else(|| AssetpipeError::TaskNotFound(name.clone()))?;

        info!("Starting '{name}'...");
        let started = Instant::now();

        let result = match entry {
            Entry::Task(task) => {
                let cx = TaskContext {
                    name: name.clone(),
                    runner: self.clone(),
                };
                task.run(cx).await
            }
            Entry::Target(target) => self.run_target(target).await,
        };

        let elapsed = format_elapsed(started.elapsed());
        match &result {
            Ok(()) => info!("Finished '{name}' after {elapsed}"),
            Err(err) => error!(error = %err, "'{name}' errored after {elapsed}"),
        }
        result
    }
}

/// Run completion signals concurrently, each on its own tokio task.
///
/// Resolves once all succeed, or with the first error as soon as it is
/// observed. Tasks still running at that point are detached, not aborted.
pub async fn join_all(futures: Vec<TaskFuture>) -> Result<()> {
    let mut set = JoinSet::new();
    for fut in futures {
        set.spawn(fut);
    }

    while let Some(joined) = set.join_next().await {
        let outcome = match joined {
            Ok(result) => result,
            Err(join_err) => Err(anyhow::Error::from(join_err).into()),
        };
        if let Err(err) = outcome {
            set.detach_all();
            return Err(err);
        }
    }
    Ok(())
}

fn format_elapsed(elapsed: Duration) -> String {
    if elapsed < Duration::from_secs(1) {
        format!("{} ms", elapsed.as_millis())
    } else {
        format!("{:.2} s", elapsed.as_secs_f64())
    }
}
