// src/engine/runtime.rs

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::engine::core::{CoreCommand, CoreRuntime, RuntimeEvent};
use crate::engine::runner::Runner;
use crate::errors::Result;
use crate::types::TaskOutcome;

/// Async IO shell around [`CoreRuntime`].
///
/// Reads events, feeds them into the core and executes the returned
/// commands: debounce timers, task runs through the [`Runner`], and page
/// reloads through the environment's reload channel.
pub struct Runtime {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    event_tx: mpsc::Sender<RuntimeEvent>,
    runner: Runner,
    delay: Duration,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    /// `event_tx` must feed `event_rx`; the runtime uses it to post timer
    /// and completion events back to itself.
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        event_tx: mpsc::Sender<RuntimeEvent>,
        runner: Runner,
        delay: Duration,
    ) -> Self {
        Self {
            core,
            event_rx,
            event_tx,
            runner,
            delay,
        }
    }

    /// Main event loop. Returns on `ShutdownRequested`.
    pub async fn run(mut self) -> Result<()> {
        info!("watch runtime started");

        while let Some(event) = self.event_rx.recv().await {
            debug!(?event, "runtime received event");

            let step = self.core.step(event);
            for command in step.commands {
                self.execute_command(command);
            }

            if !step.keep_running {
                info!("shutdown requested, stopping watch runtime");
                break;
            }
        }

        info!("watch runtime exiting");
        Ok(())
    }

    fn execute_command(&self, command: CoreCommand) {
        match command {
            CoreCommand::StartDelay(binding) => {
                let tx = self.event_tx.clone();
                let delay = self.delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(RuntimeEvent::DelayElapsed { binding }).await;
                });
            }
            CoreCommand::RunTask { binding, task } => {
                let tx = self.event_tx.clone();
                let runner = self.runner.clone();
                tokio::spawn(async move {
                    let outcome = match runner.run(&task).await {
                        Ok(()) => TaskOutcome::Success,
                        Err(err) => {
                            error!(task = %task, error = %err, "watched task failed");
                            TaskOutcome::Failed
                        }
                    };
                    let _ = tx.send(RuntimeEvent::TaskCompleted { binding, outcome }).await;
                });
            }
            CoreCommand::ReloadPage => {
                info!("markup changed, reloading browsers");
                self.runner.env().reload().reload_page();
            }
        }
    }
}
