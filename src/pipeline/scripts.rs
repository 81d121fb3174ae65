// src/pipeline/scripts.rs

//! Script pipeline: minify -> `.min` rename -> write -> live-reload refresh.
//!
//! A minification error aborts the task (and the containing target).

use anyhow::Context;
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use tracing::debug;

use crate::dag::{Task, TaskFuture};
use crate::engine::TaskContext;
use crate::errors::AssetpipeError;
use crate::pipeline::output::{with_suffix, write_file};
use crate::pipeline::sources::SourceSet;

pub const SCRIPT_SOURCES: &[&str] = &["src/js/**/*.js", "!src/js/**/*.min.js"];

pub const SCRIPT_DEST: &str = "static/js";

#[derive(Debug, Clone, Copy, Default)]
pub struct Scripts;

impl Task for Scripts {
    fn run(&self, cx: TaskContext) -> TaskFuture {
        Box::pin(async move {
            let env = cx.env();
            let dest_dir = env.path(SCRIPT_DEST);
            let files = SourceSet::new(SCRIPT_SOURCES)?.collect(env.root()).await?;
            let mut written = Vec::with_capacity(files.len());

            for file in files {
                let source = tokio::fs::read_to_string(&file.path)
                    .await
                    .with_context(|| format!("reading {:?}", file.path))?;
                let minified = tokio::task::spawn_blocking(move || minify_script(&source))
                    .await
                    .map_err(anyhow::Error::from)?
                    .map_err(|message| AssetpipeError::ScriptSyntax {
                        path: file.path.clone(),
                        message,
                    })?;

                let out = dest_dir.join(with_suffix(&file.relative, ".min"));
                write_file(&out, minified).await?;
                debug!(?out, "script minified");
                written.push(out);
            }

            env.reload().refresh_files(env.root(), &written);
            Ok(())
        })
    }
}

/// Minify a classic (non-module) browser script.
///
/// Top-level names are globals shared with other scripts and inline
/// handlers, so they are never renamed or dropped.
pub fn minify_script(source: &str) -> std::result::Result<String, String> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::default().with_script(true)).parse();
    if parsed.panicked || !parsed.errors.is_empty() {
        let messages: Vec<String> = parsed.errors.iter().map(|e| e.to_string()).collect();
        return Err(if messages.is_empty() {
            "unrecoverable parse error".to_string()
        } else {
            messages.join("; ")
        });
    }

    let mut program = parsed.program;
    let minified = Minifier::new(MinifierOptions::default()).build(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            ..CodegenOptions::default()
        })
        .with_scoping(minified.scoping)
        .build(&program)
        .code;
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_and_comments_are_removed() {
        let src = "// greeting\nfunction add(first, second) {\n    return first + second;\n}\nconsole.log(add(1, 2));\n";
        let out = minify_script(src).unwrap();
        assert!(!out.contains("// greeting"));
        assert!(!out.contains("\n    "));
        assert!(out.contains("function add("));
        assert!(out.len() < src.len());
    }

    #[test]
    fn class_accessors_stay_accessors() {
        let src = "class Box {\n  constructor(v) { this.v = v; }\n  get size() { return this.v; }\n  set size(n) { this.v = n; }\n}\nconsole.log(new Box(4).size);\n";
        let out = minify_script(src).unwrap();
        assert!(out.contains("get size(){"), "getter lost: {out}");
        assert!(out.contains("set size("), "setter lost: {out}");
    }

    #[test]
    fn functions_using_this_are_not_turned_into_arrows() {
        let src = "function onSubmit(form) {\n  return this === form;\n}\n";
        let out = minify_script(src).unwrap();
        assert!(out.contains("function onSubmit("), "{out}");
        assert!(out.contains("this"), "{out}");
        assert!(!out.contains("=>"), "{out}");
    }

    #[test]
    fn hoisted_global_function_is_kept() {
        let src = "console.log(twice(2));\nfunction twice(n) {\n  return n * 2;\n}\n";
        let out = minify_script(src).unwrap();
        assert!(out.contains("function twice("), "{out}");
        assert!(!out.contains("=>"), "{out}");
    }

    #[test]
    fn syntax_error_is_reported() {
        assert!(minify_script("function ( {").is_err());
    }
}
