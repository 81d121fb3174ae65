// src/pipeline/styles.rs

//! Stylesheet pipeline: Sass compile (expanded) -> write -> `.min` rename
//! -> minify -> write -> live-reload refresh.
//!
//! Compile and minify errors are intercepted: they are logged, the failing
//! file is skipped and the task still succeeds. Write errors are fatal.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use tracing::{debug, error, info, warn};

use crate::dag::{Task, TaskFuture};
use crate::engine::TaskContext;
use crate::errors::Result;
use crate::pipeline::output::{with_suffix, write_file};
use crate::pipeline::sources::{SourceFile, SourceSet};

pub const STYLE_SOURCES: &[&str] = &[
    "src/scss/**/*.scss",
    "static/scss/**/*.scss",
    "src/css/**/*.css",
];

pub const STYLE_DEST: &str = "static/css";

#[derive(Debug, Clone, Copy, Default)]
pub struct Styles;

impl Task for Styles {
    fn run(&self, cx: TaskContext) -> TaskFuture {
        Box::pin(async move {
            let env = cx.env();
            let load_paths: Vec<PathBuf> = env
                .config()
                .styles()
                .load_paths
                .iter()
                .map(|p| env.path(p))
                .collect();
            let dest_dir = env.path(STYLE_DEST);

            let files = SourceSet::new(STYLE_SOURCES)?.collect(env.root()).await?;
            let mut written = Vec::new();
            let mut failed = 0usize;

            for file in files.into_iter().filter(|f| !is_partial(&f.relative)) {
                if !build_stylesheet(&file, &load_paths, &dest_dir, &mut written).await? {
                    failed += 1;
                }
            }

            if failed > 0 {
                info!(failed, "stylesheets skipped because of errors");
            }
            env.reload().refresh_files(env.root(), &written);
            Ok(())
        })
    }
}

/// Build one stylesheet. `Ok(false)` means a compile or minify error was
/// logged and the remaining steps for this file were skipped.
async fn build_stylesheet(
    file: &SourceFile,
    load_paths: &[PathBuf],
    dest_dir: &Path,
    written: &mut Vec<PathBuf>,
) -> Result<bool> {
    let expanded = {
        let path = file.path.clone();
        let load_paths = load_paths.to_vec();
        tokio::task::spawn_blocking(move || compile_stylesheet(&path, &load_paths))
            .await
            .map_err(anyhow::Error::from)?
    };
    let expanded = match expanded {
        Ok(css) => css,
        Err(message) => {
            error!(file = ?file.path, "Sass compile error: {message}");
            return Ok(false);
        }
    };

    let rel_css = file.relative.with_extension("css");
    let out = dest_dir.join(&rel_css);
    write_file(&out, expanded.as_bytes()).await?;
    written.push(out);

    let filename = rel_css.to_string_lossy().into_owned();
    let minified = tokio::task::spawn_blocking(move || minify_stylesheet(&expanded, &filename))
        .await
        .map_err(anyhow::Error::from)?;
    let minified = match minified {
        Ok(css) => css,
        Err(message) => {
            error!(file = ?file.path, "CSS minify error: {message}");
            return Ok(false);
        }
    };

    let min_out = dest_dir.join(with_suffix(&rel_css, ".min"));
    write_file(&min_out, minified.as_bytes()).await?;
    debug!(?min_out, "stylesheet built");
    written.push(min_out);
    Ok(true)
}

/// Sass partials (`_name.scss`) are only compiled through imports.
pub fn is_partial(relative: &Path) -> bool {
    relative
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('_'))
        .unwrap_or(false)
}

/// Compile a Sass/SCSS/CSS file to expanded CSS.
pub fn compile_stylesheet(path: &Path, load_paths: &[PathBuf]) -> std::result::Result<String, String> {
    let options = grass::Options::default()
        .style(grass::OutputStyle::Expanded)
        .load_paths(load_paths);
    grass::from_path(path, &options).map_err(|e| e.to_string())
}

/// Minify CSS text.
///
/// Invalid rules and declarations (old IE hacks like `*zoom: 1`) are
/// dropped with a warning instead of failing the whole file.
pub fn minify_stylesheet(css: &str, filename: &str) -> std::result::Result<String, String> {
    let warnings = Arc::new(RwLock::new(Vec::new()));
    let options = ParserOptions {
        filename: filename.to_string(),
        error_recovery: true,
        warnings: Some(Arc::clone(&warnings)),
        ..ParserOptions::default()
    };
    let mut sheet = StyleSheet::parse(css, options).map_err(|e| e.to_string())?;
    if let Ok(recovered) = warnings.read() {
        for warning in recovered.iter() {
            warn!(file = filename, "skipped invalid CSS: {warning}");
        }
    }
    sheet
        .minify(MinifyOptions::default())
        .map_err(|e| e.to_string())?;
    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;
    Ok(printed.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partials_are_recognised_by_leading_underscore() {
        assert!(is_partial(Path::new("mixins/_buttons.scss")));
        assert!(!is_partial(Path::new("site.scss")));
    }

    #[test]
    fn minify_strips_whitespace() {
        let min = minify_stylesheet("body {\n  margin: 0px;\n}\n", "site.css").unwrap();
        assert!(min.starts_with("body{margin:0"));
        assert!(!min.contains('\n'));
    }

    #[test]
    fn ie_star_hack_is_dropped_not_fatal() {
        let css = ".a {\n  -webkit-box-shadow: 0 0 0 red;\n  *zoom: 1;\n}\n.b {\n  color: red;\n}\n";
        let min = minify_stylesheet(css, "legacy.css").unwrap();
        assert!(min.contains(".b{color:red}"), "{min}");
        assert!(!min.contains("zoom"), "{min}");
    }
}
