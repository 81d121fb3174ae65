// src/types.rs

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Outcome of a single task run, as seen by the watch runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}
