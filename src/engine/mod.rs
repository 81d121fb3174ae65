// src/engine/mod.rs

//! Orchestration engine for assetpipe.
//!
//! - [`runner`] drives a composite target to completion with `series` /
//!   `parallel` semantics.
//! - [`core`] is the pure watch-mode state machine: debounce, one queued
//!   re-run per binding, page reloads.
//! - [`runtime`] is the async IO shell around the core (timers, task runs,
//!   reload notifications).

pub mod core;
pub mod runner;
pub mod runtime;

pub use core::{BindingId, CoreCommand, CoreRuntime, CoreStep, RuntimeEvent};
pub use runner::{Runner, TaskContext, join_all};
pub use runtime::Runtime;
