use image::imageops::FilterType;

use crate::foundation::core::{Canvas, PixelPoint, PremulImage};
use crate::foundation::error::OvermarkResult;
use crate::layer::geometry::{Footprint, ResolvedLayer};
use crate::layer::model::Layer;
use crate::raster::logo::{centered_top_left, load_logo, scale_to_width};
use crate::raster::svg::{FontOpts, SvgRenderer};
use crate::raster::text::{TextStyle, canvas_text_svg};
use crate::raster::tile::{fit_tile_logo_width, logo_cell, repeat_across, text_cell};

/// Options for [`Rasterizer`].
#[derive(Clone, Debug)]
pub struct RasterOpts {
    /// Font lookup for text kinds.
    pub fonts: FontOpts,
    /// Resampling filter used when scaling logos.
    pub resize_filter: FilterType,
}

impl Default for RasterOpts {
    fn default() -> Self {
        Self {
            fonts: FontOpts::default(),
            resize_filter: FilterType::Lanczos3,
        }
    }
}

/// Pixels produced for one layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RasterizedLayer {
    /// Text or logo raster placed at `top_left`. Text is cropped to its ink.
    Positioned {
        /// Premultiplied pixels.
        image: PremulImage,
        /// Placement on the canvas.
        top_left: PixelPoint,
    },
    /// Canvas-sized tiled pattern, drawn at the origin.
    FullCanvas(PremulImage),
}

impl RasterizedLayer {
    /// The pixels.
    pub fn image(&self) -> &PremulImage {
        match self {
            Self::Positioned { image, .. } | Self::FullCanvas(image) => image,
        }
    }

    /// Where the pixels go on the canvas.
    pub fn top_left(&self) -> PixelPoint {
        match self {
            Self::Positioned { top_left, .. } => *top_left,
            Self::FullCanvas(_) => PixelPoint::ORIGIN,
        }
    }
}

/// Converts layers into positioned premultiplied rasters.
#[derive(Clone, Debug)]
pub struct Rasterizer {
    svg: SvgRenderer,
    family: String,
    resize_filter: FilterType,
}

impl Rasterizer {
    /// Build a rasterizer, loading fonts once.
    pub fn new(opts: &RasterOpts) -> OvermarkResult<Self> {
        Ok(Self {
            svg: SvgRenderer::new(&opts.fonts)?,
            family: opts.fonts.family.clone(),
            resize_filter: opts.resize_filter,
        })
    }

    /// Number of font faces available to text layers.
    pub fn font_faces(&self) -> usize {
        self.svg.font_faces()
    }

    /// Rasterize a single layer against `canvas`.
    pub fn rasterize(&self, layer: &Layer, canvas: Canvas) -> OvermarkResult<RasterizedLayer> {
        self.rasterize_resolved(&ResolvedLayer::new(0, layer, canvas))
    }

    /// Rasterize a layer whose footprint was already resolved for the job.
    pub fn rasterize_resolved(
        &self,
        resolved: &ResolvedLayer<'_>,
    ) -> OvermarkResult<RasterizedLayer> {
        let layer = resolved.layer;
        let canvas = resolved.canvas;
        let style = |font_px| TextStyle {
            text: layer.display_text(),
            font_px,
            color: layer.color,
            alpha: resolved.alpha(),
            family: &self.family,
        };

        match resolved.footprint {
            Footprint::Text { font_px, center } => {
                let doc = canvas_text_svg(canvas, &style(font_px), center);
                let (image, top_left) = self.svg.render_cropped(&doc, canvas)?;
                Ok(RasterizedLayer::Positioned { image, top_left })
            }
            Footprint::Logo { width_px, center } => {
                let src = load_logo(layer.asset()?)?;
                let mut image = scale_to_width(&src, width_px, self.resize_filter)?;
                apply_alpha(&mut image, resolved.alpha());
                let top_left = centered_top_left(center, image.width, image.height);
                Ok(RasterizedLayer::Positioned { image, top_left })
            }
            Footprint::TiledText { font_px } => {
                let cell = text_cell(&self.svg, &style(font_px))?;
                Ok(RasterizedLayer::FullCanvas(repeat_across(&cell, canvas)))
            }
            Footprint::TiledLogo { width_px } => {
                let src = load_logo(layer.asset()?)?;
                let fitted = fit_tile_logo_width(width_px, src.width(), src.height());
                if fitted < width_px {
                    tracing::debug!(
                        layer = resolved.index,
                        requested = width_px,
                        fitted,
                        "tiled logo shrunk to fit the tile cell"
                    );
                }
                let logo = scale_to_width(&src, fitted, self.resize_filter)?;
                let cell = logo_cell(&logo, resolved.alpha())?;
                Ok(RasterizedLayer::FullCanvas(repeat_across(&cell, canvas)))
            }
        }
    }
}

/// Scale every channel of a premultiplied raster by `alpha`.
fn apply_alpha(image: &mut PremulImage, alpha: f32) {
    use rayon::prelude::*;

    if alpha >= 1.0 {
        return;
    }
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u16;
    image.data.par_iter_mut().for_each(|c| {
        *c = crate::foundation::math::mul_div255_u8(u16::from(*c), a);
    });
}

#[cfg(test)]
#[path = "../../tests/unit/raster/rasterizer.rs"]
mod tests;
