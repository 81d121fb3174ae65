// src/dag/task.rs

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::engine::TaskContext;
use crate::errors::Result;

/// Completion signal returned by every task.
///
/// Resolves once the task's side effects are fully observable on disk (or,
/// for servers and watchers, once they stop).
pub type TaskFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

/// A named unit of build work.
///
/// Implementations clone whatever they need out of `self` and the context
/// into the returned future, so the future owns its state.
pub trait Task: Send + Sync {
    fn run(&self, cx: TaskContext) -> TaskFuture;
}

/// Adapter turning a closure into a [`Task`].
pub struct FnTask<F>(pub F);

impl<F> fmt::Debug for FnTask<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTask").finish_non_exhaustive()
    }
}

impl<F> Task for FnTask<F>
where
    F: Fn(TaskContext) -> TaskFuture + Send + Sync,
{
    fn run(&self, cx: TaskContext) -> TaskFuture {
        (self.0)(cx)
    }
}
