// src/watch/patterns.rs

use std::fmt;

use anyhow::Context;
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

use crate::errors::Result;
use crate::pipeline::sources::glob_base;
use crate::types::TaskName;

/// What happens when a watch binding fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchAction {
    /// Re-run a registered task.
    RunTask(TaskName),
    /// Tell connected browsers to reload the page.
    ReloadPage,
}

/// Uncompiled watch binding.
///
/// ```text
/// watch   = ["static/js/**/*"]
/// exclude = ["static/js/**/*.min.js"]
/// action  = RunTask("js")
/// ```
#[derive(Debug, Clone)]
pub struct RawWatchSpec {
    pub watch: Vec<String>,
    pub exclude: Vec<String>,
    pub action: WatchAction,
}

impl RawWatchSpec {
    pub fn new<W, S>(watch: W, exclude: W, action: WatchAction) -> Self
    where
        W: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            watch: watch.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
            action,
        }
    }
}

/// The bindings `watch-files` installs.
pub fn default_watch_specs() -> Vec<RawWatchSpec> {
    vec![
        RawWatchSpec::new(
            vec!["static/scss/**/*"],
            vec![],
            WatchAction::RunTask("css".into()),
        ),
        RawWatchSpec::new(
            vec!["static/js/**/*"],
            vec!["static/js/**/*.min.js"],
            WatchAction::RunTask("js".into()),
        ),
        RawWatchSpec::new(vec!["*.html"], vec![], WatchAction::ReloadPage),
    ]
}

/// Compiled watch binding.
///
/// Patterns are relative to the project root; the watcher passes relative,
/// slash-separated paths (e.g. `"static/js/app.js"`) into `matches`.
#[derive(Clone)]
pub struct WatchBinding {
    watch_set: GlobSet,
    exclude_set: Option<GlobSet>,
    bases: Vec<WatchBase>,
    action: WatchAction,
}

/// Directory the watcher has to observe for a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchBase {
    /// Root-relative directory; empty for the root itself.
    pub dir: String,
    /// Whether matches can occur below `dir`.
    pub recursive: bool,
}

impl fmt::Debug for WatchBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBinding")
            .field("action", &self.action)
            .field("bases", &self.bases)
            .finish_non_exhaustive()
    }
}

impl WatchBinding {
    pub fn action(&self) -> &WatchAction {
        &self.action
    }

    pub fn bases(&self) -> &[WatchBase] {
        &self.bases
    }

    /// Returns true if a change to `rel_path` should fire this binding.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.watch_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Compile each spec into a [`WatchBinding`], preserving order.
pub fn build_watch_bindings(specs: &[RawWatchSpec]) -> Result<Vec<WatchBinding>> {
    let mut bindings = Vec::with_capacity(specs.len());

    for spec in specs {
        let watch_set = build_globset(&spec.watch)
            .with_context(|| format!("building watch globset for {:?}", spec.action))?;

        let exclude_set = if spec.exclude.is_empty() {
            None
        } else {
            Some(
                build_globset(&spec.exclude)
                    .with_context(|| format!("building exclude globset for {:?}", spec.action))?,
            )
        };

        bindings.push(WatchBinding {
            watch_set,
            exclude_set,
            bases: spec.watch.iter().map(|p| watch_base(p)).collect(),
            action: spec.action.clone(),
        });
    }

    Ok(bindings)
}

fn watch_base(pattern: &str) -> WatchBase {
    let dir = glob_base(pattern);
    let rest = pattern
        .trim_start_matches("./")
        .strip_prefix(dir.as_str())
        .unwrap_or(pattern)
        .trim_start_matches('/');
    WatchBase {
        recursive: rest.contains('/') || rest.contains("**"),
        dir,
    }
}

/// Compile one glob where `*` does not cross `/`.
pub fn compile_glob(pattern: &str) -> Result<Glob> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob pattern: {pattern}"))?;
    Ok(glob)
}

/// Build a GlobSet from simple string patterns.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(compile_glob(pat)?);
    }
    let set = builder.build().context("building glob set")?;
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings() -> Vec<WatchBinding> {
        build_watch_bindings(&default_watch_specs()).unwrap()
    }

    #[test]
    fn scss_changes_rerun_css() {
        let b = bindings();
        assert!(b[0].matches("static/scss/site.scss"));
        assert!(b[0].matches("static/scss/bootstrap/mixins/_grid.scss"));
        assert_eq!(b[0].action(), &WatchAction::RunTask("css".into()));
    }

    #[test]
    fn minified_scripts_do_not_rerun_js() {
        let b = bindings();
        assert!(b[1].matches("static/js/app.js"));
        assert!(!b[1].matches("static/js/app.min.js"));
        assert!(!b[1].matches("static/js/vendor/lib.min.js"));
    }

    #[test]
    fn only_top_level_html_reloads() {
        let b = bindings();
        assert!(b[2].matches("index.html"));
        assert!(!b[2].matches("docs/index.html"));
        assert_eq!(b[2].action(), &WatchAction::ReloadPage);
    }

    #[test]
    fn bases_know_when_to_recurse() {
        let b = bindings();
        assert_eq!(
            b[0].bases(),
            &[WatchBase {
                dir: "static/scss".into(),
                recursive: true
            }]
        );
        assert_eq!(
            b[2].bases(),
            &[WatchBase {
                dir: String::new(),
                recursive: false
            }]
        );
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let spec = RawWatchSpec::new(vec!["static/[js"], vec![], WatchAction::ReloadPage);
        assert!(build_watch_bindings(&[spec]).is_err());
    }
}
