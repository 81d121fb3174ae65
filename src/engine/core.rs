// src/engine/core.rs

//! Pure core runtime state machine for watch mode.
//!
//! The core consumes [`RuntimeEvent`]s and produces [`CoreCommand`]s for the
//! IO shell (`engine::runtime::Runtime`). It owns no channels, timers or
//! tasks, so every rule below is unit tested synchronously.
//!
//! Per binding:
//! - a change while idle starts the debounce delay;
//! - more changes during the delay are coalesced;
//! - when the delay elapses the bound task runs (or the page reloads);
//! - changes while the task runs queue exactly one re-run, which goes
//!   through the delay again once the current run completes.

use tracing::debug;

use crate::types::{TaskName, TaskOutcome};
use crate::watch::WatchAction;

/// Index of a watch binding, in the order the bindings were built.
pub type BindingId = usize;

/// Events flowing into the watch runtime.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A watched path matching `binding` changed.
    PathChanged { binding: BindingId, path: String },
    /// The debounce delay for `binding` elapsed.
    DelayElapsed { binding: BindingId },
    /// The task bound to `binding` finished.
    TaskCompleted {
        binding: BindingId,
        outcome: TaskOutcome,
    },
    /// Stop the runtime.
    ShutdownRequested,
}

/// Command produced by the pure core, to be executed by the IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start the debounce timer for a binding.
    StartDelay(BindingId),
    /// Run the named task on behalf of a binding.
    RunTask { binding: BindingId, task: TaskName },
    /// Tell live-reload clients to reload the whole page.
    ReloadPage,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    pub keep_running: bool,
}

impl CoreStep {
    fn keep(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingState {
    Idle,
    Debouncing,
    Running { queued: bool },
}

/// Pure watch-mode state: one slot per binding.
#[derive(Debug)]
pub struct CoreRuntime {
    actions: Vec<WatchAction>,
    states: Vec<BindingState>,
}

impl CoreRuntime {
    pub fn new(actions: Vec<WatchAction>) -> Self {
        let states = vec![BindingState::Idle; actions.len()];
        Self { actions, states }
    }

    /// True when no binding is debouncing or running (for tests).
    pub fn is_idle(&self) -> bool {
        self.states.iter().all(|s| *s == BindingState::Idle)
    }

    /// Whether a re-run is queued behind the current run of `binding`.
    pub fn has_queued_run(&self, binding: BindingId) -> bool {
        matches!(
            self.states.get(binding),
            Some(BindingState::Running { queued: true })
        )
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::PathChanged { binding, path } => self.on_change(binding, &path),
            RuntimeEvent::DelayElapsed { binding } => self.on_delay_elapsed(binding),
            RuntimeEvent::TaskCompleted { binding, outcome } => {
                self.on_completed(binding, outcome)
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }

    fn on_change(&mut self, binding: BindingId, path: &str) -> CoreStep {
        let Some(state) = self.states.get_mut(binding) else {
            debug!(binding, "change for unknown binding ignored");
            return CoreStep::keep(Vec::new());
        };

        match *state {
            BindingState::Idle => {
                debug!(binding, path, "change detected, starting delay");
                *state = BindingState::Debouncing;
                CoreStep::keep(vec![CoreCommand::StartDelay(binding)])
            }
            BindingState::Debouncing => CoreStep::keep(Vec::new()),
            BindingState::Running { .. } => {
                debug!(binding, path, "change while running, queueing one re-run");
                *state = BindingState::Running { queued: true };
                CoreStep::keep(Vec::new())
            }
        }
    }

    fn on_delay_elapsed(&mut self, binding: BindingId) -> CoreStep {
        let (Some(state), Some(action)) = (self.states.get_mut(binding), self.actions.get(binding))
        else {
            return CoreStep::keep(Vec::new());
        };

        if *state != BindingState::Debouncing {
            return CoreStep::keep(Vec::new());
        }

        match action {
            WatchAction::RunTask(task) => {
                *state = BindingState::Running { queued: false };
                CoreStep::keep(vec![CoreCommand::RunTask {
                    binding,
                    task: task.clone(),
                }])
            }
            WatchAction::ReloadPage => {
                *state = BindingState::Idle;
                CoreStep::keep(vec![CoreCommand::ReloadPage])
            }
        }
    }

    fn on_completed(&mut self, binding: BindingId, outcome: TaskOutcome) -> CoreStep {
        let Some(state) = self.states.get_mut(binding) else {
            return CoreStep::keep(Vec::new());
        };

        match *state {
            BindingState::Running { queued: true } => {
                debug!(binding, ?outcome, "run finished, starting queued re-run");
                *state = BindingState::Debouncing;
                CoreStep::keep(vec![CoreCommand::StartDelay(binding)])
            }
            BindingState::Running { queued: false } => {
                *state = BindingState::Idle;
                CoreStep::keep(Vec::new())
            }
            BindingState::Idle | BindingState::Debouncing => CoreStep::keep(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core() -> CoreRuntime {
        CoreRuntime::new(vec![
            WatchAction::RunTask("css".into()),
            WatchAction::ReloadPage,
        ])
    }

    fn changed(binding: BindingId) -> RuntimeEvent {
        RuntimeEvent::PathChanged {
            binding,
            path: "static/scss/site.scss".into(),
        }
    }

    #[test]
    fn burst_of_changes_starts_a_single_delay() {
        let mut core = core();
        assert_eq!(core.step(changed(0)).commands, vec![CoreCommand::StartDelay(0)]);
        assert!(core.step(changed(0)).commands.is_empty());
        assert!(core.step(changed(0)).commands.is_empty());

        let step = core.step(RuntimeEvent::DelayElapsed { binding: 0 });
        assert_eq!(
            step.commands,
            vec![CoreCommand::RunTask {
                binding: 0,
                task: "css".into()
            }]
        );
    }

    #[test]
    fn changes_while_running_queue_exactly_one_rerun() {
        let mut core = core();
        core.step(changed(0));
        core.step(RuntimeEvent::DelayElapsed { binding: 0 });

        assert!(core.step(changed(0)).commands.is_empty());
        assert!(core.step(changed(0)).commands.is_empty());
        assert!(core.has_queued_run(0));

        let step = core.step(RuntimeEvent::TaskCompleted {
            binding: 0,
            outcome: TaskOutcome::Success,
        });
        assert_eq!(step.commands, vec![CoreCommand::StartDelay(0)]);

        core.step(RuntimeEvent::DelayElapsed { binding: 0 });
        let step = core.step(RuntimeEvent::TaskCompleted {
            binding: 0,
            outcome: TaskOutcome::Success,
        });
        assert!(step.commands.is_empty());
        assert!(core.is_idle());
    }

    #[test]
    fn failed_run_returns_binding_to_idle() {
        let mut core = core();
        core.step(changed(0));
        core.step(RuntimeEvent::DelayElapsed { binding: 0 });
        let step = core.step(RuntimeEvent::TaskCompleted {
            binding: 0,
            outcome: TaskOutcome::Failed,
        });
        assert!(step.keep_running);
        assert!(core.is_idle());
    }

    #[test]
    fn markup_binding_reloads_page_without_running_a_task() {
        let mut core = core();
        core.step(changed(1));
        let step = core.step(RuntimeEvent::DelayElapsed { binding: 1 });
        assert_eq!(step.commands, vec![CoreCommand::ReloadPage]);
        assert!(core.is_idle());
    }

    #[test]
    fn bindings_are_independent() {
        let mut core = core();
        core.step(changed(0));
        core.step(RuntimeEvent::DelayElapsed { binding: 0 });

        assert_eq!(core.step(changed(1)).commands, vec![CoreCommand::StartDelay(1)]);
        assert!(!core.has_queued_run(0));
    }

    #[test]
    fn stale_delay_and_unknown_binding_are_ignored() {
        let mut core = core();
        assert!(core.step(RuntimeEvent::DelayElapsed { binding: 0 }).commands.is_empty());
        assert!(core.step(changed(7)).commands.is_empty());
        assert!(core.is_idle());
    }

    #[test]
    fn shutdown_stops_the_loop() {
        let mut core = core();
        assert!(!core.step(RuntimeEvent::ShutdownRequested).keep_running);
    }
}
