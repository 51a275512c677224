use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};

pub use kurbo::{Affine, Point};

/// Pixel dimensions of the source media. Every percentage field of a layer resolves against
/// this once per job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> OvermarkResult<Self> {
        if width == 0 || height == 0 {
            return Err(OvermarkError::validation(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// `round(max(min_px, width * pct / 100))`.
    pub fn width_pct_px(self, pct: f64, min_px: u32) -> u32 {
        (f64::from(self.width) * pct / 100.0)
            .max(f64::from(min_px))
            .round() as u32
    }

    /// Point at `(x_pct% of width, y_pct% of height)`.
    pub fn point_at_pct(self, x_pct: f64, y_pct: f64) -> Point {
        Point::new(
            f64::from(self.width) * x_pct / 100.0,
            f64::from(self.height) * y_pct / 100.0,
        )
    }

    /// Number of pixels covered by the canvas.
    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Integer top-left placement of a raster on the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl PixelPoint {
    /// The canvas origin.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a placement.
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Raster in premultiplied RGBA8, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PremulImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl PremulImage {
    /// Fully transparent raster.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * 4],
        }
    }

    /// Wrap premultiplied bytes, checking the length.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> OvermarkResult<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(OvermarkError::validation(format!(
                "premultiplied buffer has {} bytes, expected {width}x{height}x4",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Premultiply a straight-alpha image.
    pub fn from_straight(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let mut data = img.into_raw();
        premultiply_rgba8_in_place(&mut data);
        Self {
            width,
            height,
            data,
        }
    }

    /// Take ownership of a `tiny-skia` pixmap (already premultiplied).
    pub fn from_pixmap(pixmap: resvg::tiny_skia::Pixmap) -> Self {
        let width = pixmap.width();
        let height = pixmap.height();
        Self {
            width,
            height,
            data: pixmap.take(),
        }
    }

    /// Copy into a `tiny-skia` pixmap for further drawing.
    pub fn to_pixmap(&self) -> OvermarkResult<resvg::tiny_skia::Pixmap> {
        let size = resvg::tiny_skia::IntSize::from_wh(self.width, self.height).ok_or_else(|| {
            OvermarkError::validation(format!(
                "cannot build a pixmap of {}x{}",
                self.width, self.height
            ))
        })?;
        resvg::tiny_skia::Pixmap::from_vec(self.data.clone(), size)
            .ok_or_else(|| OvermarkError::validation("pixmap buffer size mismatch"))
    }

    /// Convert back to a straight-alpha image.
    pub fn to_straight(&self) -> OvermarkResult<image::RgbaImage> {
        let mut data = self.data.clone();
        unpremultiply_rgba8_in_place(&mut data);
        image::RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| OvermarkError::validation("rgba buffer size mismatch"))
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// `true` when every pixel is fully transparent.
    pub fn is_fully_transparent(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }

    /// Dimensions as a [`Canvas`].
    pub fn size(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }
}

/// Convert a `kurbo` affine into the equivalent `tiny-skia` transform.
pub(crate) fn skia_transform(affine: Affine) -> resvg::tiny_skia::Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    resvg::tiny_skia::Transform::from_row(
        a as f32, b as f32, c as f32, d as f32, e as f32, f as f32,
    )
}

/// SVG `transform` attribute value for `affine`.
pub(crate) fn svg_matrix(affine: Affine) -> String {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    format!("matrix({a} {b} {c} {d} {e} {f})")
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
