// src/pipeline/assets.rs

use tracing::debug;

use crate::dag::{Task, TaskFuture};
use crate::engine::TaskContext;
use crate::pipeline::output::copy_sources;
use crate::pipeline::sources::SourceSet;

/// Verbatim copy of static browser assets, followed by a live-reload
/// refresh of the written files.
#[derive(Debug, Clone, Copy)]
pub struct CopyAssets {
    sources: &'static [&'static str],
    dest: &'static str,
}

impl CopyAssets {
    /// Raster images: `src/img/**/*.{jpg,png}` -> `static/img`.
    pub const fn images() -> Self {
        Self {
            sources: &["src/img/**/*.jpg", "src/img/**/*.png"],
            dest: "static/img",
        }
    }

    /// Vector images: `src/svg/**/*.svg` -> `static/svg`.
    pub const fn svg() -> Self {
        Self {
            sources: &["src/svg/**/*.svg"],
            dest: "static/svg",
        }
    }
}

impl Task for CopyAssets {
    fn run(&self, cx: TaskContext) -> TaskFuture {
        let this = *self;
        Box::pin(async move {
            let env = cx.env();
            let files = SourceSet::new(this.sources)?.collect(env.root()).await?;
            let written = copy_sources(&files, &env.path(this.dest)).await?;
            debug!(task = cx.name(), files = written.len(), "copied assets");
            env.reload().refresh_files(env.root(), &written);
            Ok(())
        })
    }
}
