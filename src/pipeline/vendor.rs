// src/pipeline/vendor.rs

use tracing::debug;

use crate::dag::{Task, TaskFuture};
use crate::engine::{TaskContext, join_all};
use crate::pipeline::output::copy_sources;
use crate::pipeline::sources::SourceSet;

/// One third-party dependency copied verbatim into the output tree.
#[derive(Debug, Clone, Copy)]
pub struct VendorCopy {
    pub label: &'static str,
    pub sources: &'static [&'static str],
    pub dest: &'static str,
}

/// The fixed dependency copies performed by [`Vendor`].
pub const VENDOR_COPIES: [VendorCopy; 4] = [
    VendorCopy {
        label: "bootstrap-js",
        sources: &["node_modules/bootstrap/dist/js/*"],
        dest: "static/js/bootstrap",
    },
    VendorCopy {
        label: "bootstrap-scss",
        sources: &["node_modules/bootstrap/scss/**/*"],
        dest: "static/scss/bootstrap",
    },
    VendorCopy {
        label: "font-awesome",
        sources: &["node_modules/@fortawesome/**/*"],
        dest: "static/font",
    },
    VendorCopy {
        label: "jquery",
        sources: &[
            "node_modules/jquery/dist/*",
            "!node_modules/jquery/dist/core.js",
        ],
        dest: "static/js/jquery",
    },
];

/// Copies front-end dependencies from `node_modules` into `static/`.
/// The four copies run concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vendor;

impl Task for Vendor {
    fn run(&self, cx: TaskContext) -> TaskFuture {
        let copies = VENDOR_COPIES
            .iter()
            .map(|copy| run_copy(*copy, cx.clone()))
            .collect();
        Box::pin(join_all(copies))
    }
}

fn run_copy(copy: VendorCopy, cx: TaskContext) -> TaskFuture {
    Box::pin(async move {
        let root = cx.env().root().to_path_buf();
        let files = SourceSet::new(copy.sources)?.collect(&root).await?;
        let written = copy_sources(&files, &cx.env().path(copy.dest)).await?;
        debug!(copy = copy.label, files = written.len(), "vendor copy done");
        Ok(())
    })
}
