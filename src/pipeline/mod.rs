// src/pipeline/mod.rs

//! The asset pipeline tasks and the environment they share.
//!
//! Every task resolves its source globs at run time against the project
//! root, writes under `static/`, and (where it produces browser assets)
//! notifies the live-reload channel.

pub mod assets;
pub mod clean;
pub mod output;
pub mod scripts;
pub mod sources;
pub mod styles;
pub mod vendor;

use std::path::{Path, PathBuf};

use crate::config::ConfigFile;
use crate::serve::ReloadChannel;

pub use assets::CopyAssets;
pub use clean::Clean;
pub use scripts::Scripts;
pub use sources::{SourceFile, SourceSet};
pub use styles::Styles;
pub use vendor::Vendor;

/// Build output directory, relative to the project root.
pub const OUTPUT_DIR: &str = "static";

/// Shared, read-only state for all tasks of one process.
#[derive(Debug, Clone)]
pub struct PipelineEnv {
    root: PathBuf,
    config: ConfigFile,
    reload: ReloadChannel,
}

impl PipelineEnv {
    pub fn new(root: impl Into<PathBuf>, config: ConfigFile, reload: ReloadChannel) -> Self {
        Self {
            root: root.into(),
            config,
            reload,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a root-relative path.
    pub fn path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root.join(rel)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.path(OUTPUT_DIR)
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn reload(&self) -> &ReloadChannel {
        &self.reload
    }
}
