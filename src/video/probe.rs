use std::path::Path;

use crate::foundation::core::Canvas;
use crate::foundation::error::{OvermarkError, OvermarkResult};

/// What the video path needs to know about a source before building a filter graph.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoInfo {
    /// Dimensions of the first video stream.
    pub canvas: Canvas,
    /// Whether any audio stream exists.
    pub has_audio: bool,
    /// Container duration, `0.0` when ffprobe does not report one.
    pub duration_sec: f64,
    /// Codec of the first video stream.
    pub video_codec: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Run `ffprobe` on `source_path` and read its first video stream.
#[tracing::instrument(skip(ffprobe_bin), fields(source = %source_path.display()))]
pub fn probe_video(ffprobe_bin: &Path, source_path: &Path) -> OvermarkResult<VideoInfo> {
    let out = std::process::Command::new(ffprobe_bin)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| {
            OvermarkError::probe(format!(
                "failed to run '{}': {e}",
                ffprobe_bin.display()
            ))
        })?;
    if !out.status.success() {
        return Err(OvermarkError::probe(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let info = parse_probe_json(&out.stdout)?;
    tracing::debug!(
        width = info.canvas.width,
        height = info.canvas.height,
        has_audio = info.has_audio,
        "probed source"
    );
    Ok(info)
}

/// Parse `ffprobe -print_format json -show_streams -show_format` output.
pub fn parse_probe_json(json: &[u8]) -> OvermarkResult<VideoInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| OvermarkError::probe(format!("ffprobe json parse failed: {e}")))?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| OvermarkError::probe("no video stream found"))?;
    let (Some(width), Some(height)) = (video.width, video.height) else {
        return Err(OvermarkError::probe(
            "missing video width/height from ffprobe",
        ));
    };
    let canvas = Canvas::new(width, height)
        .map_err(|_| OvermarkError::probe(format!("video stream is {width}x{height}")))?;

    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoInfo {
        canvas,
        has_audio,
        duration_sec,
        video_codec: video.codec_name.clone(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/video/probe.rs"]
mod tests;
