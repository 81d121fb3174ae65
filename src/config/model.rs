// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [project]
/// root = "."
///
/// [styles]
/// load_paths = ["node_modules"]
///
/// [server]
/// host = "0.0.0.0"
/// dev_port = 3000
/// deploy_port = 5000
///
/// [watch]
/// delay_ms = 200
/// ```
///
/// All sections are optional; the defaults describe the standard
/// `src/` + `node_modules/` -> `static/` layout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub project: ProjectSection,

    #[serde(default)]
    pub styles: StylesSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// A validated configuration. Only obtainable through
/// `TryFrom<RawConfigFile>` (or `Default`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    project: ProjectSection,
    styles: StylesSection,
    server: ServerSection,
    watch: WatchSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            project: raw.project,
            styles: raw.styles,
            server: raw.server,
            watch: raw.watch,
        }
    }

    pub fn project(&self) -> &ProjectSection {
        &self.project
    }

    pub fn styles(&self) -> &StylesSection {
        &self.styles
    }

    pub fn server(&self) -> &ServerSection {
        &self.server
    }

    pub fn watch(&self) -> &WatchSection {
        &self.watch
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[project]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectSection {
    /// Project root, relative to the directory holding the config file.
    #[serde(default)]
    pub root: Option<String>,
}

/// `[styles]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StylesSection {
    /// Extra directories searched by `@use` / `@import`, relative to the
    /// project root.
    #[serde(default = "default_load_paths")]
    pub load_paths: Vec<String>,
}

fn default_load_paths() -> Vec<String> {
    vec!["node_modules".to_string()]
}

impl Default for StylesSection {
    fn default() -> Self {
        Self {
            load_paths: default_load_paths(),
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the live-reload development server (`watch`).
    #[serde(default = "default_dev_port")]
    pub dev_port: u16,

    /// Port of the plain static server (`deploy`) when `PORT` is unset.
    #[serde(default = "default_deploy_port")]
    pub deploy_port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_dev_port() -> u16 {
    3000
}

fn default_deploy_port() -> u16 {
    5000
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            dev_port: default_dev_port(),
            deploy_port: default_deploy_port(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Quiet period after a change before the bound task runs.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_delay_ms() -> u64 {
    200
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
        }
    }
}
