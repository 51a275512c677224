use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::core::{Canvas, PixelPoint, PremulImage};
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::raster::MAX_RASTER_DIM;

/// Margin kept around cropped content, in pixels.
const CROP_PAD: f32 = 2.0;

/// Where text layers find their fonts.
#[derive(Clone, Debug)]
pub struct FontOpts {
    /// Load fonts installed on the system.
    pub load_system_fonts: bool,
    /// Extra font files to register.
    pub font_files: Vec<PathBuf>,
    /// `font-family` used for text layers.
    pub family: String,
}

impl Default for FontOpts {
    fn default() -> Self {
        Self {
            load_system_fonts: true,
            font_files: Vec::new(),
            family: "sans-serif".to_owned(),
        }
    }
}

/// Renders generated SVG documents into premultiplied rasters with a fixed font database.
#[derive(Clone)]
pub struct SvgRenderer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for SvgRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgRenderer")
            .field("font_faces", &self.fontdb.len())
            .finish()
    }
}

impl SvgRenderer {
    /// Build the font database described by `opts`.
    pub fn new(opts: &FontOpts) -> OvermarkResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        if opts.load_system_fonts {
            db.load_system_fonts();
        }
        for path in &opts.font_files {
            db.load_font_file(path)
                .with_context(|| format!("load font file '{}'", path.display()))?;
        }

        // Generic families default to names that may not be installed; point them at
        // something that is.
        let has_sans = db
            .query(&usvg::fontdb::Query {
                families: &[usvg::fontdb::Family::SansSerif],
                ..Default::default()
            })
            .is_some();
        let fallback = db
            .faces()
            .find_map(|face| face.families.first().map(|(name, _)| name.clone()));
        if !has_sans && let Some(name) = fallback {
            db.set_sans_serif_family(name);
        }

        tracing::debug!(faces = db.len(), "font database ready");
        Ok(Self {
            fontdb: Arc::new(db),
        })
    }

    /// Number of registered font faces.
    pub fn font_faces(&self) -> usize {
        self.fontdb.len()
    }

    fn parse(&self, svg: &str) -> OvermarkResult<usvg::Tree> {
        let opts = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..Default::default()
        };
        Ok(usvg::Tree::from_str(svg, &opts).context("parse generated svg")?)
    }

    fn pixmap(width: u32, height: u32) -> OvermarkResult<resvg::tiny_skia::Pixmap> {
        if width > MAX_RASTER_DIM || height > MAX_RASTER_DIM {
            return Err(OvermarkError::validation(format!(
                "raster size too large: {width}x{height} (max {MAX_RASTER_DIM}x{MAX_RASTER_DIM})"
            )));
        }
        resvg::tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            OvermarkError::validation(format!("failed to allocate {width}x{height} pixmap"))
        })
    }

    /// Parse `svg` and render it at 1:1 into a `width x height` raster.
    pub fn render(&self, svg: &str, width: u32, height: u32) -> OvermarkResult<PremulImage> {
        let mut pixmap = Self::pixmap(width, height)?;
        let tree = self.parse(svg)?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );
        Ok(PremulImage::from_pixmap(pixmap))
    }

    /// Parse `svg`, laid out in `canvas` coordinates, and render only the region its content
    /// covers, clipped to the canvas.
    ///
    /// Returns the raster and where its top-left sits on the canvas. A document that draws
    /// nothing (text without usable fonts, for instance) yields a `0x0` raster at the origin.
    pub fn render_cropped(
        &self,
        svg: &str,
        canvas: Canvas,
    ) -> OvermarkResult<(PremulImage, PixelPoint)> {
        let tree = self.parse(svg)?;
        let bbox = tree.root().abs_stroke_bounding_box();

        // Antialiased edges reach past the geometric bounds.
        let x0 = (bbox.left() - CROP_PAD).floor().max(0.0);
        let y0 = (bbox.top() - CROP_PAD).floor().max(0.0);
        let x1 = (bbox.right() + CROP_PAD).ceil().min(canvas.width as f32);
        let y1 = (bbox.bottom() + CROP_PAD).ceil().min(canvas.height as f32);
        if bbox.width() <= 0.0 || bbox.height() <= 0.0 || x1 <= x0 || y1 <= y0 {
            return Ok((PremulImage::transparent(0, 0), PixelPoint::ORIGIN));
        }

        let mut pixmap = Self::pixmap((x1 - x0) as u32, (y1 - y0) as u32)?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::from_translate(-x0, -y0),
            &mut pixmap.as_mut(),
        );
        Ok((
            PremulImage::from_pixmap(pixmap),
            PixelPoint::new(x0 as u32, y0 as u32),
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/svg.rs"]
mod tests;
