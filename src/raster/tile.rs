//! Diagonal repeating patterns.
//!
//! One tile cell holds the content centered and turned by -45 degrees about the cell center.
//! The cell is then repeated with no gaps across the canvas, so `canvas(x, y)` always equals
//! `cell(x mod tile_w, y mod tile_h)` and the pattern is seamless at any canvas size.

use rayon::prelude::*;

use crate::foundation::core::{Affine, Canvas, Point, PremulImage, skia_transform};
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::raster::MAX_RASTER_DIM;
use crate::raster::logo::scaled_height;
use crate::raster::svg::SvgRenderer;
use crate::raster::text::{TextStyle, tile_text_svg};

/// Rotation applied to the content of every tile cell, in degrees.
pub const TILE_ROTATION_DEG: f64 = -45.0;
/// Cell size as a multiple of the logo size.
pub const LOGO_TILE_FACTOR: u32 = 3;
/// Smallest text tile edge.
pub const MIN_TEXT_TILE_PX: u32 = 50;

/// Estimated glyph advance as a fraction of the font size.
const CHAR_WIDTH_FACTOR: f64 = 0.8;

/// Size of one repeating cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TilePeriod {
    /// Horizontal period in pixels.
    pub width: u32,
    /// Vertical period in pixels.
    pub height: u32,
}

impl TilePeriod {
    /// Period for a logo scaled to `logo_w x logo_h`.
    pub fn for_logo(logo_w: u32, logo_h: u32) -> Self {
        Self {
            width: logo_w * LOGO_TILE_FACTOR,
            height: logo_h * LOGO_TILE_FACTOR,
        }
    }

    /// Period for text of `char_count` UTF-16 code units at `font_px`, from an average glyph
    /// width estimate rather than measured glyphs. Characters outside the Basic Multilingual
    /// Plane count twice.
    pub fn for_text(char_count: usize, font_px: u32) -> Self {
        let fs = f64::from(font_px);
        let char_w = fs * CHAR_WIDTH_FACTOR;
        let w = (char_count as f64 * char_w + fs * 3.0).round() as u32;
        let h = (fs * 4.0).round() as u32;
        Self {
            width: w.max(MIN_TEXT_TILE_PX),
            height: h.max(MIN_TEXT_TILE_PX),
        }
    }

    fn check(self) -> OvermarkResult<Self> {
        if self.width == 0 || self.height == 0 {
            return Err(OvermarkError::validation("tile cell must be non-empty"));
        }
        if self.width > MAX_RASTER_DIM || self.height > MAX_RASTER_DIM {
            return Err(OvermarkError::validation(format!(
                "tile cell too large: {}x{} (max {MAX_RASTER_DIM}x{MAX_RASTER_DIM})",
                self.width, self.height
            )));
        }
        Ok(self)
    }
}

/// Largest logo width, at most `width_px`, whose tile cell still fits in a raster when a
/// `src_w x src_h` logo is scaled to it.
pub(crate) fn fit_tile_logo_width(width_px: u32, src_w: u32, src_h: u32) -> u32 {
    let max_content = MAX_RASTER_DIM / LOGO_TILE_FACTOR;
    let by_height = (u64::from(max_content) * u64::from(src_w) / u64::from(src_h.max(1))) as u32;
    let mut width = width_px.min(max_content).min(by_height.max(1)).max(1);
    while width > 1 && scaled_height(src_w, src_h, width) > max_content {
        width -= 1;
    }
    width
}

/// Rotation about the center of a cell of `period`.
pub(crate) fn cell_rotation(period: TilePeriod) -> Affine {
    Affine::rotate_about(
        TILE_ROTATION_DEG.to_radians(),
        Point::new(f64::from(period.width) / 2.0, f64::from(period.height) / 2.0),
    )
}

/// Cell with `logo` centered, rotated and faded by `alpha`. Only the logo is faded; the rest of
/// the cell stays transparent.
pub(crate) fn logo_cell(logo: &PremulImage, alpha: f32) -> OvermarkResult<PremulImage> {
    let period = TilePeriod::for_logo(logo.width, logo.height).check()?;
    let mut cell = resvg::tiny_skia::Pixmap::new(period.width, period.height)
        .ok_or_else(|| OvermarkError::validation("failed to allocate tile cell"))?;

    let src = logo.to_pixmap()?;
    let paint = resvg::tiny_skia::PixmapPaint {
        opacity: alpha.clamp(0.0, 1.0),
        quality: resvg::tiny_skia::FilterQuality::Bilinear,
        ..Default::default()
    };
    let offset_x = (period.width - logo.width) / 2;
    let offset_y = (period.height - logo.height) / 2;
    cell.draw_pixmap(
        offset_x as i32,
        offset_y as i32,
        src.as_ref(),
        &paint,
        skia_transform(cell_rotation(period)),
        None,
    );
    Ok(PremulImage::from_pixmap(cell))
}

/// Cell with the text centered and rotated. Opacity is applied to the glyphs only.
pub(crate) fn text_cell(
    svg: &SvgRenderer,
    style: &TextStyle<'_>,
) -> OvermarkResult<PremulImage> {
    let period = TilePeriod::for_text(style.text.encode_utf16().count(), style.font_px).check()?;
    let doc = tile_text_svg(period.width, period.height, style, cell_rotation(period));
    svg.render(&doc, period.width, period.height)
}

/// Repeat `cell` from the origin until it covers `canvas` exactly.
pub(crate) fn repeat_across(cell: &PremulImage, canvas: Canvas) -> PremulImage {
    let mut out = PremulImage::transparent(canvas.width, canvas.height);
    if cell.width == 0 || cell.height == 0 {
        return out;
    }

    let row_bytes = canvas.width as usize * 4;
    let cell_row_bytes = cell.width as usize * 4;
    out.data
        .par_chunks_exact_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            let src_y = y % cell.height as usize;
            let src = &cell.data[src_y * cell_row_bytes..(src_y + 1) * cell_row_bytes];
            for dst in row.chunks_mut(cell_row_bytes) {
                dst.copy_from_slice(&src[..dst.len()]);
            }
        });
    out
}

#[cfg(test)]
#[path = "../../tests/unit/raster/tile.rs"]
mod tests;
