//! Job entry point: classify the source, pick an output name, dispatch to the image or video
//! path.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::composite::image::compose_image_file;
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::foundation::fs::extension_lower;
use crate::layer::model::ProcessingJob;
use crate::raster::rasterizer::{RasterOpts, Rasterizer};
use crate::video::transcode::{VideoOpts, transcode_video};

/// Still-image extensions, lower case.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
/// Video extensions, lower case.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];

/// Which path a source takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Decoded and composited in-process.
    Image,
    /// Transcoded through an ffmpeg filter graph.
    Video,
}

impl MediaKind {
    /// Classify by extension, case-insensitively.
    pub fn from_path(path: &Path) -> OvermarkResult<Self> {
        let ext = extension_lower(path).unwrap_or_default();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Ok(Self::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Ok(Self::Video)
        } else {
            Err(OvermarkError::validation(format!(
                "unsupported file type '{}'",
                path.display()
            )))
        }
    }
}

/// `<out_dir>/<stem>_<unix-millis>-<8 hex>.<ext>` for `source`.
pub fn output_path_for(source: &Path, out_dir: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_owned());
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let id = Uuid::new_v4().simple().to_string();
    let mut name = format!("{stem}_{millis}-{}", &id[..8]);
    if let Some(ext) = source.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    out_dir.join(name)
}

/// Everything configurable about a job.
#[derive(Clone, Debug, Default)]
pub struct EngineOpts {
    /// Fonts and resampling for layer rasters.
    pub raster: RasterOpts,
    /// ffmpeg location and filter-graph behaviour.
    pub video: VideoOpts,
}

/// Loaded fonts plus options; reusable across jobs.
#[derive(Clone, Debug)]
pub struct Engine {
    rasterizer: Rasterizer,
    video: VideoOpts,
}

impl Engine {
    /// Load fonts and keep `opts` for later jobs.
    pub fn new(opts: &EngineOpts) -> OvermarkResult<Self> {
        Ok(Self {
            rasterizer: Rasterizer::new(&opts.raster)?,
            video: opts.video.clone(),
        })
    }

    /// The layer rasterizer, for callers that only want layer pixels.
    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }

    /// Process `job` into a freshly named file under `out_dir`.
    pub fn process(&self, job: &ProcessingJob, out_dir: &Path) -> OvermarkResult<PathBuf> {
        let out_path = output_path_for(&job.source_path, out_dir);
        self.process_to(job, &out_path)?;
        Ok(out_path)
    }

    /// Process `job` into `out_path`.
    pub fn process_to(&self, job: &ProcessingJob, out_path: &Path) -> OvermarkResult<()> {
        let kind = MediaKind::from_path(&job.source_path)?;
        job.validate()?;
        tracing::info!(
            source = %job.source_path.display(),
            ?kind,
            layers = job.layers.len(),
            "processing job"
        );
        match kind {
            MediaKind::Image => compose_image_file(job, out_path, &self.rasterizer)?,
            MediaKind::Video => transcode_video(job, out_path, &self.rasterizer, &self.video)?,
        }
        tracing::info!(out = %out_path.display(), "job finished");
        Ok(())
    }
}

/// One-shot helper: build an [`Engine`] and process a single job into `out_dir`.
pub fn process_job(
    job: &ProcessingJob,
    out_dir: &Path,
    opts: &EngineOpts,
) -> OvermarkResult<PathBuf> {
    Engine::new(opts)?.process(job, out_dir)
}

#[cfg(test)]
#[path = "../tests/unit/job.rs"]
mod tests;
