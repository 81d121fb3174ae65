// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling the fixed watch bindings (glob set -> action).
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - The `watch-files` task that feeds both into the watch runtime.
//!
//! It does **not** know how tasks are composed; it only turns filesystem
//! changes into binding-level events.

pub mod files;
pub mod patterns;
pub mod watcher;

pub use files::WatchFiles;
pub use patterns::{
    RawWatchSpec, WatchAction, WatchBinding, build_globset, build_watch_bindings, compile_glob,
    default_watch_specs,
};
pub use watcher::{WatcherHandle, spawn_watcher};
