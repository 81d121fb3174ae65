#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assetpipe::config::ConfigFile;
use assetpipe::dag::Registry;
use assetpipe::engine::Runner;
use assetpipe::pipeline::PipelineEnv;
use assetpipe::serve::ReloadChannel;
use tempfile::TempDir;

/// A throwaway project directory populated file by file.
///
/// ```ignore
/// let project = ProjectFixture::new()
///     .file("src/js/app.js", "console.log(1);")
///     .file("index.html", "<html><body></body></html>");
/// ```
pub struct ProjectFixture {
    dir: TempDir,
    reload: ReloadChannel,
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp project dir"),
            reload: ReloadChannel::new(),
        }
    }

    /// Write `contents` to `rel`, creating parent directories.
    pub fn file(self, rel: &str, contents: impl AsRef<[u8]>) -> Self {
        self.write(rel, contents);
        self
    }

    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture dirs");
        }
        fs::write(&path, contents).expect("write fixture file");
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel))
            .unwrap_or_else(|e| panic!("reading fixture file {rel}: {e}"))
    }

    /// The reload channel shared by every env built from this fixture.
    pub fn reload(&self) -> &ReloadChannel {
        &self.reload
    }

    pub fn env(&self) -> PipelineEnv {
        self.env_with_config(ConfigFile::default())
    }

    pub fn env_with_config(&self, config: ConfigFile) -> PipelineEnv {
        PipelineEnv::new(self.root(), config, self.reload.clone())
    }

    /// Runner over the built-in tasks and targets.
    pub fn runner(&self) -> Runner {
        self.runner_with(assetpipe::builtin_registry())
    }

    pub fn runner_with(&self, registry: Registry) -> Runner {
        Runner::new(registry, self.env()).expect("valid registry")
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}
