use std::path::Path;

use image::imageops::FilterType;

use crate::foundation::core::{PixelPoint, Point, PremulImage};
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::raster::MAX_RASTER_DIM;

/// Read and decode a logo asset. Failures are asset errors.
pub(crate) fn load_logo(path: &Path) -> OvermarkResult<image::RgbaImage> {
    let reader = image::ImageReader::open(path)
        .map_err(|e| OvermarkError::asset(format!("cannot read '{}': {e}", path.display())))?
        .with_guessed_format()
        .map_err(|e| OvermarkError::asset(format!("cannot read '{}': {e}", path.display())))?;
    let img = reader.decode().map_err(|e| {
        OvermarkError::asset(format!("cannot decode '{}': {e}", path.display()))
    })?;
    if img.width() == 0 || img.height() == 0 {
        return Err(OvermarkError::asset(format!(
            "'{}' has no pixels",
            path.display()
        )));
    }
    Ok(img.to_rgba8())
}

/// Height that keeps the aspect ratio when `src` is scaled to `width_px`.
pub(crate) fn scaled_height(src_w: u32, src_h: u32, width_px: u32) -> u32 {
    ((f64::from(src_h) * f64::from(width_px) / f64::from(src_w)).round() as u32).max(1)
}

/// Scale `img` to `width_px`, preserving its aspect ratio, and premultiply.
pub(crate) fn scale_to_width(
    img: &image::RgbaImage,
    width_px: u32,
    filter: FilterType,
) -> OvermarkResult<PremulImage> {
    let height_px = scaled_height(img.width(), img.height(), width_px);
    if width_px > MAX_RASTER_DIM || height_px > MAX_RASTER_DIM {
        return Err(OvermarkError::validation(format!(
            "scaled logo too large: {width_px}x{height_px} (max {MAX_RASTER_DIM}x{MAX_RASTER_DIM})"
        )));
    }
    let scaled = if (width_px, height_px) == img.dimensions() {
        img.clone()
    } else {
        image::imageops::resize(img, width_px, height_px, filter)
    };
    Ok(PremulImage::from_straight(scaled))
}

/// Top-left that puts the center of a `width x height` raster on `center`, clamped so the
/// raster never starts left of or above the canvas.
pub(crate) fn centered_top_left(center: Point, width: u32, height: u32) -> PixelPoint {
    let half_w = (f64::from(width) / 2.0).round();
    let half_h = (f64::from(height) / 2.0).round();
    PixelPoint::new(
        (center.x - half_w).max(0.0) as u32,
        (center.y - half_h).max(0.0) as u32,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/raster/logo.rs"]
mod tests;
