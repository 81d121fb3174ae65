// src/pipeline/sources.rs

//! Run-time resolution of gulp-style source globs.
//!
//! A [`SourceSet`] is an ordered list of inclusion globs plus `!`-prefixed
//! exclusions. Each inclusion has a *base*: its leading directories up to
//! the first component containing a glob metacharacter. Matched files keep
//! their path relative to that base, which is how destination trees mirror
//! source trees.
//!
//! Like node-glob, `*` never crosses a `/` and paths with a component
//! starting with `.` below the base are not matched.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use globset::{GlobMatcher, GlobSet};
use walkdir::WalkDir;

use crate::errors::Result;
use crate::watch::patterns::{build_globset, compile_glob};

/// A file matched by a [`SourceSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute (root-joined) path of the file.
    pub path: PathBuf,
    /// Path relative to the base of the glob that matched it.
    pub relative: PathBuf,
}

#[derive(Debug, Clone)]
struct IncludePattern {
    base: String,
    matcher: GlobMatcher,
}

/// Compiled include/exclude glob list.
#[derive(Debug, Clone)]
pub struct SourceSet {
    includes: Vec<IncludePattern>,
    excludes: Option<GlobSet>,
}

impl SourceSet {
    /// Compile patterns; entries starting with `!` are exclusions. A leading
    /// `./` is ignored.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut includes = Vec::new();
        let mut exclude_patterns = Vec::new();

        for raw in patterns {
            let raw = raw.as_ref();
            match raw.strip_prefix('!') {
                Some(negated) => exclude_patterns.push(normalize(negated).to_string()),
                None => {
                    let pattern = normalize(raw);
                    includes.push(IncludePattern {
                        base: glob_base(pattern),
                        matcher: compile_glob(pattern)?.compile_matcher(),
                    });
                }
            }
        }

        let excludes = if exclude_patterns.is_empty() {
            None
        } else {
            Some(build_globset(&exclude_patterns)?)
        };

        Ok(Self { includes, excludes })
    }

    /// Walk the filesystem under `root` and return matching files.
    ///
    /// Files are grouped by inclusion pattern (in declaration order) and
    /// sorted within each group; a file matched by several patterns is
    /// reported once, for the first one. Missing base directories match
    /// nothing.
    pub fn resolve(&self, root: &Path) -> Result<Vec<SourceFile>> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for include in &self.includes {
            let base_dir = root.join(&include.base);
            if !base_dir.exists() {
                continue;
            }

            let mut group = Vec::new();
            for entry in WalkDir::new(&base_dir) {
                let entry =
                    entry.with_context(|| format!("walking source directory {:?}", base_dir))?;
                if !entry.file_type().is_file() {
                    continue;
                }

                let path = entry.path();
                let Ok(relative) = path.strip_prefix(&base_dir) else {
                    continue;
                };
                if is_hidden(relative) {
                    continue;
                }
                let Some(rel_to_root) = slash_path(root, path) else {
                    continue;
                };
                if !include.matcher.is_match(&rel_to_root) {
                    continue;
                }
                if let Some(excludes) = &self.excludes {
                    if excludes.is_match(&rel_to_root) {
                        continue;
                    }
                }
                if seen.insert(path.to_path_buf()) {
                    group.push(SourceFile {
                        path: path.to_path_buf(),
                        relative: relative.to_path_buf(),
                    });
                }
            }

            group.sort_by(|a, b| a.path.cmp(&b.path));
            files.extend(group);
        }

        Ok(files)
    }

    /// [`resolve`](Self::resolve) on the blocking pool.
    pub async fn collect(&self, root: &Path) -> Result<Vec<SourceFile>> {
        let set = self.clone();
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || set.resolve(&root))
            .await
            .map_err(anyhow::Error::from)?
    }
}

fn normalize(pattern: &str) -> &str {
    pattern.strip_prefix("./").unwrap_or(pattern)
}

/// Leading directory of a glob pattern that contains no metacharacters.
///
/// `node_modules/bootstrap/scss/**/*` -> `node_modules/bootstrap/scss`,
/// `*.html` -> `` (the root itself). For a literal file path the base is its
/// parent directory.
pub fn glob_base(pattern: &str) -> String {
    let pattern = normalize(pattern);
    let parts: Vec<&str> = pattern.split('/').collect();
    let literal: Vec<&str> = parts
        .iter()
        .take_while(|part| !part.contains(|c: char| matches!(c, '*' | '?' | '[' | '{')))
        .copied()
        .collect();

    if literal.len() == parts.len() {
        // No glob at all: the last component is the file itself.
        return parts[..parts.len().saturating_sub(1)].join("/");
    }
    literal.join("/")
}

/// `path` relative to `root`, with forward slashes.
pub fn slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

fn is_hidden(relative: &Path) -> bool {
    relative.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}
