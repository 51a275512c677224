//! Still-image path: decode once, rasterize every layer against the decoded size, composite
//! back to front, write a new file.

use std::io::Cursor;
use std::path::Path;

use anyhow::Context as _;
use image::{DynamicImage, ImageFormat};

use crate::composite::blend::over_at;
use crate::foundation::core::{Canvas, PremulImage};
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::foundation::fs::{ensure_parent_dir, extension_lower};
use crate::layer::geometry::ResolvedJob;
use crate::layer::model::{Layer, ProcessingJob, validate_layers};
use crate::raster::rasterizer::{RasterizedLayer, Rasterizer};

/// Composite `layers` over `base` in order; layer 0 ends up at the bottom.
pub fn compose(base: &mut PremulImage, layers: &[RasterizedLayer]) {
    for layer in layers {
        over_at(base, layer.image(), layer.top_left());
    }
}

/// Rasterize every layer, skipping (and logging) the ones that fail.
fn rasterize_best_effort(
    resolved: &ResolvedJob<'_>,
    rasterizer: &Rasterizer,
) -> Vec<RasterizedLayer> {
    let mut out = Vec::with_capacity(resolved.layers.len());
    for layer in &resolved.layers {
        match rasterizer.rasterize_resolved(layer) {
            Ok(r) => out.push(r),
            Err(e) if e.is_layer_local() => tracing::warn!(
                layer = layer.index,
                kind = layer.layer.content().name(),
                error = %e,
                "skipping layer with unusable asset"
            ),
            Err(e) => tracing::error!(
                layer = layer.index,
                kind = layer.layer.content().name(),
                error = %e,
                "skipping layer that failed to rasterize"
            ),
        }
    }
    out
}

/// Composite layers onto a decoded image. Returns `None` when no layer produced pixels.
fn render_decoded(
    decoded: &DynamicImage,
    layers: &[Layer],
    rasterizer: &Rasterizer,
) -> OvermarkResult<Option<DynamicImage>> {
    let canvas = Canvas::new(decoded.width(), decoded.height())
        .map_err(|_| OvermarkError::decode("source image has no pixels"))?;
    let resolved = ResolvedJob::new(layers, canvas);
    let rasters = rasterize_best_effort(&resolved, rasterizer);
    if rasters.is_empty() {
        return Ok(None);
    }

    let mut base = PremulImage::from_straight(decoded.to_rgba8());
    compose(&mut base, &rasters);
    let composited = DynamicImage::ImageRgba8(base.to_straight()?);

    Ok(Some(if decoded.color().has_alpha() {
        composited
    } else {
        DynamicImage::ImageRgb8(composited.to_rgb8())
    }))
}

/// Convert to a pixel layout the encoder for `format` accepts.
fn fit_to_format(img: DynamicImage, format: ImageFormat) -> DynamicImage {
    match (format, &img) {
        (ImageFormat::Jpeg, DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_)) => img,
        (ImageFormat::Jpeg, _) => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    }
}

fn decode(bytes: &[u8], what: &str) -> OvermarkResult<(DynamicImage, Option<ImageFormat>)> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| OvermarkError::decode(format!("cannot read {what}: {e}")))?;
    let format = reader.format();
    let img = reader
        .decode()
        .map_err(|e| OvermarkError::decode(format!("cannot decode {what}: {e}")))?;
    Ok((img, format))
}

/// Watermark `job.source_path` and write the result to `out_path`.
///
/// The job is validated before anything is decoded. A layer that fails to rasterize is skipped;
/// only an unreadable source or a failed write fails the job. With no usable layer the source is
/// written through unchanged (byte copy when the extension matches).
#[tracing::instrument(skip_all, fields(source = %job.source_path.display(), out = %out_path.display()))]
pub fn compose_image_file(
    job: &ProcessingJob,
    out_path: &Path,
    rasterizer: &Rasterizer,
) -> OvermarkResult<()> {
    job.validate()?;
    if out_path == job.source_path {
        return Err(OvermarkError::validation(
            "output path must differ from the source path",
        ));
    }

    let what = format!("'{}'", job.source_path.display());
    let bytes = std::fs::read(&job.source_path)
        .map_err(|e| OvermarkError::decode(format!("cannot read {what}: {e}")))?;
    let (decoded, _) = decode(&bytes, &what)?;
    tracing::info!(
        width = decoded.width(),
        height = decoded.height(),
        layers = job.layers.len(),
        "compositing image"
    );

    ensure_parent_dir(out_path)?;
    let format = ImageFormat::from_path(out_path)
        .map_err(|e| OvermarkError::encode(format!("unsupported output format: {e}")))?;

    let rendered = render_decoded(&decoded, &job.layers, rasterizer)?;
    let Some(rendered) = rendered else {
        if extension_lower(out_path) == extension_lower(&job.source_path) {
            tracing::info!("no usable layers, copying source through");
            std::fs::write(out_path, &bytes)
                .with_context(|| format!("write '{}'", out_path.display()))?;
        } else {
            tracing::info!("no usable layers, re-encoding source unchanged");
            write_image(fit_to_format(decoded, format), out_path, format)?;
        }
        return Ok(());
    };

    write_image(fit_to_format(rendered, format), out_path, format)
}

fn write_image(img: DynamicImage, out_path: &Path, format: ImageFormat) -> OvermarkResult<()> {
    img.save_with_format(out_path, format).map_err(|e| {
        let _ = std::fs::remove_file(out_path);
        OvermarkError::encode(format!("cannot write '{}': {e}", out_path.display()))
    })
}

/// In-memory variant of [`compose_image_file`]: decode `source`, composite `layers`, encode as
/// `format`. With no usable layer and a matching format the input bytes are returned as-is.
pub fn compose_image_bytes(
    source: &[u8],
    layers: &[Layer],
    format: ImageFormat,
    rasterizer: &Rasterizer,
) -> OvermarkResult<Vec<u8>> {
    validate_layers(layers)?;
    let (decoded, source_format) = decode(source, "source image")?;

    let img = match render_decoded(&decoded, layers, rasterizer)? {
        Some(rendered) => rendered,
        None if source_format == Some(format) => return Ok(source.to_vec()),
        None => decoded,
    };

    let mut out = Vec::new();
    fit_to_format(img, format)
        .write_to(&mut Cursor::new(&mut out), format)
        .map_err(|e| OvermarkError::encode(format!("cannot encode {format:?}: {e}")))?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/composite/image.rs"]
mod tests;
