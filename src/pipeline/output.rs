// src/pipeline/output.rs

//! Writing task output: copies, file writes and destination naming.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::errors::Result;
use crate::pipeline::sources::SourceFile;

/// Write `contents` to `dest`, creating parent directories.
pub async fn write_file(dest: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    ensure_parent(dest).await?;
    tokio::fs::write(dest, contents)
        .await
        .with_context(|| format!("writing {:?}", dest))?;
    debug!(?dest, "wrote file");
    Ok(())
}

/// Copy `from` to `to` verbatim, creating parent directories.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    ensure_parent(to).await?;
    tokio::fs::copy(from, to)
        .await
        .with_context(|| format!("copying {:?} to {:?}", from, to))?;
    Ok(())
}

/// Copy each source file to `dest_dir`, preserving its base-relative path.
/// Returns the written paths.
pub async fn copy_sources(files: &[SourceFile], dest_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let dest = dest_dir.join(&file.relative);
        copy_file(&file.path, &dest).await?;
        written.push(dest);
    }
    Ok(written)
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating directory {:?}", parent))?;
    }
    Ok(())
}

/// Insert `suffix` between the file stem and its extension:
/// `a/site.css` + `.min` -> `a/site.min.css`.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_goes_before_extension() {
        assert_eq!(with_suffix(Path::new("site.css"), ".min"), PathBuf::from("site.min.css"));
        assert_eq!(
            with_suffix(Path::new("vendor/app.js"), ".min"),
            PathBuf::from("vendor/app.min.js")
        );
        assert_eq!(with_suffix(Path::new("LICENSE"), ".min"), PathBuf::from("LICENSE.min"));
    }
}
