//! Per-job scratch files for the video path.
//!
//! Names carry a per-job UUID so concurrent jobs sharing a temp directory never collide. Both
//! guards clean up on drop, which covers every early return and panic unwind.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use uuid::Uuid;

use crate::foundation::core::PremulImage;
use crate::foundation::error::{OvermarkError, OvermarkResult};

/// Intermediate per-layer images of one job.
#[derive(Debug)]
pub struct TempArtifacts {
    dir: PathBuf,
    job_id: Uuid,
    paths: Vec<PathBuf>,
}

impl TempArtifacts {
    /// Scratch files go under `dir`, or the system temp directory when `None`.
    pub fn new(dir: Option<&Path>) -> Self {
        Self {
            dir: dir.map_or_else(std::env::temp_dir, Path::to_path_buf),
            job_id: Uuid::new_v4(),
            paths: Vec::new(),
        }
    }

    /// Files written so far.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Write `image` as a PNG scratch file tagged with `label`.
    pub fn write_png(&mut self, label: &str, image: &PremulImage) -> OvermarkResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create temp directory '{}'", self.dir.display()))?;
        let path = self.dir.join(format!(
            "overmark-{}-{}-{label}.png",
            self.job_id.simple(),
            self.paths.len()
        ));
        // Track before writing so a half-written file is still removed.
        self.paths.push(path.clone());

        image
            .to_straight()?
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| {
                OvermarkError::encode(format!(
                    "cannot write layer image '{}': {e}",
                    path.display()
                ))
            })?;
        tracing::debug!(path = %path.display(), "wrote layer image");
        Ok(path)
    }

    /// Remove every scratch file. Safe to call more than once.
    pub fn cleanup(&mut self) {
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed layer image"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove layer image")
                }
            }
        }
    }
}

impl Drop for TempArtifacts {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Output file that only appears at its final path once the encode succeeded.
///
/// The encoder writes to a hidden sibling; [`PartialOutput::commit`] renames it into place and
/// dropping an uncommitted guard removes it.
#[derive(Debug)]
pub struct PartialOutput {
    partial: PathBuf,
    final_path: PathBuf,
    committed: bool,
}

impl PartialOutput {
    /// Reserve a partial path next to `final_path`, keeping its extension so muxers can be
    /// inferred from it.
    pub fn new(final_path: &Path) -> Self {
        let name = final_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_owned());
        let id = Uuid::new_v4().simple().to_string();
        let mut partial_name = format!(".{name}.partial-{}", &id[..8]);
        if let Some(ext) = final_path.extension() {
            partial_name.push('.');
            partial_name.push_str(&ext.to_string_lossy());
        }
        Self {
            partial: final_path.with_file_name(partial_name),
            final_path: final_path.to_path_buf(),
            committed: false,
        }
    }

    /// Where the encoder should write.
    pub fn path(&self) -> &Path {
        &self.partial
    }

    /// Move the finished file into place.
    pub fn commit(mut self) -> OvermarkResult<PathBuf> {
        std::fs::rename(&self.partial, &self.final_path).with_context(|| {
            format!(
                "move '{}' to '{}'",
                self.partial.display(),
                self.final_path.display()
            )
        })?;
        self.committed = true;
        Ok(self.final_path.clone())
    }
}

impl Drop for PartialOutput {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.partial);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/video/temp.rs"]
mod tests;
