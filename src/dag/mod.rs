// src/dag/mod.rs

//! Task graph definition.
//!
//! - [`task`] defines the single completion-signal abstraction every task
//!   implements.
//! - [`target`] holds the `series` / `parallel` composition operators.
//! - [`registry`] maps names to tasks and composite targets and checks that
//!   the reference graph is closed and acyclic.

pub mod registry;
pub mod target;
pub mod task;

pub use registry::{Entry, Registry};
pub use target::{Target, parallel, series, task};
pub use task::{FnTask, Task, TaskFuture};
