use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context as _;

use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::foundation::fs::ensure_parent_dir;
use crate::layer::model::{LayerOrder, ProcessingJob};
use crate::raster::rasterizer::Rasterizer;
use crate::video::filter_graph::{FilterGraph, build_filter_graph};
use crate::video::probe::probe_video;
use crate::video::temp::{PartialOutput, TempArtifacts};

/// Options for the video path.
#[derive(Clone, Debug)]
pub struct VideoOpts {
    /// `ffmpeg` executable.
    pub ffmpeg_bin: PathBuf,
    /// `ffprobe` executable.
    pub ffprobe_bin: PathBuf,
    /// Directory for per-layer images; the system temp directory when `None`.
    pub temp_dir: Option<PathBuf>,
    /// Stacking order of layers in the filter graph.
    pub layer_order: LayerOrder,
    /// `-c:v` value; ffmpeg picks the container default when `None`.
    pub video_codec: Option<String>,
    /// Replace an existing output file.
    pub overwrite: bool,
}

impl Default for VideoOpts {
    fn default() -> Self {
        Self {
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            ffprobe_bin: PathBuf::from("ffprobe"),
            temp_dir: None,
            layer_order: LayerOrder::TypePriority,
            video_codec: None,
            overwrite: true,
        }
    }
}

/// Whether `bin -version` runs successfully.
pub fn is_tool_available(bin: &Path) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Whether `ffmpeg` and `ffprobe` are both on `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_tool_available(Path::new("ffmpeg")) && is_tool_available(Path::new("ffprobe"))
}

/// Full ffmpeg argument list for one transcode.
pub fn ffmpeg_args(
    source: &Path,
    graph: &FilterGraph,
    out_path: &Path,
    opts: &VideoOpts,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-loglevel", "error", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(source.into());
    for input in &graph.inputs {
        args.push("-i".into());
        args.push(input.into());
    }
    args.push("-filter_complex".into());
    args.push(graph.filter_complex().into());
    if let Some(label) = &graph.output_label {
        args.push("-map".into());
        args.push(format!("[{label}]").into());
    }
    // Audio, when present, is copied untouched.
    for a in ["-map", "0:a?", "-c:a", "copy"] {
        args.push(a.into());
    }
    if let Some(codec) = &opts.video_codec {
        args.push("-c:v".into());
        args.push(codec.into());
    }
    args.push(out_path.into());
    args
}

fn copy_through(source: &Path, out_path: &Path) -> OvermarkResult<()> {
    let partial = PartialOutput::new(out_path);
    std::fs::copy(source, partial.path())
        .with_context(|| format!("copy '{}' to '{}'", source.display(), out_path.display()))?;
    partial.commit()?;
    Ok(())
}

fn run_ffmpeg(ffmpeg_bin: &Path, args: &[OsString]) -> OvermarkResult<()> {
    let output = Command::new(ffmpeg_bin)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            OvermarkError::encode(format!(
                "failed to spawn '{}' (is it installed and on PATH?): {e}",
                ffmpeg_bin.display()
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(OvermarkError::encode(format!(
            "ffmpeg exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Watermark the video at `job.source_path` and write it to `out_path`.
///
/// Blocks until ffmpeg exits. Per-layer images and any partial output are removed on every
/// exit path; `out_path` only appears once the transcode succeeded.
#[tracing::instrument(skip_all, fields(source = %job.source_path.display(), out = %out_path.display()))]
pub fn transcode_video(
    job: &ProcessingJob,
    out_path: &Path,
    rasterizer: &Rasterizer,
    opts: &VideoOpts,
) -> OvermarkResult<()> {
    job.validate()?;
    if out_path == job.source_path {
        return Err(OvermarkError::validation(
            "output path must differ from the source path",
        ));
    }
    if !opts.overwrite && out_path.exists() {
        return Err(OvermarkError::validation(format!(
            "output file '{}' already exists",
            out_path.display()
        )));
    }
    ensure_parent_dir(out_path)?;

    if job.layers.is_empty() {
        tracing::info!("no layers, copying source through");
        return copy_through(&job.source_path, out_path);
    }

    let info = probe_video(&opts.ffprobe_bin, &job.source_path)?;
    let resolved = job.resolve(info.canvas);

    let mut temps = TempArtifacts::new(opts.temp_dir.as_deref());
    let graph = build_filter_graph(&resolved, opts.layer_order, rasterizer, &mut temps)?;
    if graph.is_empty() {
        tracing::info!("no filter stages, copying source through");
        return copy_through(&job.source_path, out_path);
    }

    if !is_tool_available(&opts.ffmpeg_bin) {
        return Err(OvermarkError::encode(format!(
            "'{}' is required for video output but could not be run",
            opts.ffmpeg_bin.display()
        )));
    }

    let partial = PartialOutput::new(out_path);
    let args = ffmpeg_args(&job.source_path, &graph, partial.path(), opts);
    tracing::info!(
        width = info.canvas.width,
        height = info.canvas.height,
        layers = job.layers.len(),
        has_audio = info.has_audio,
        "transcoding video"
    );
    tracing::debug!(filter_complex = %graph.filter_complex(), "ffmpeg filter graph");

    let result = run_ffmpeg(&opts.ffmpeg_bin, &args);
    temps.cleanup();
    result?;
    partial.commit()?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/video/transcode.rs"]
mod tests;
