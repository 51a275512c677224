//! Percentage-to-pixel resolution.
//!
//! A job resolves all of its layers against one [`Canvas`] in a single pass, so every layer
//! agrees on the same pixel basis no matter which path (image or video) consumes it.

use crate::foundation::core::{Canvas, Point};
use crate::layer::model::{Content, Layer, LayerOrder, ProcessingJob};

/// Smallest font size for text kinds.
pub const MIN_FONT_PX: u32 = 12;
/// Smallest scaled width for anchored logos.
pub const MIN_LOGO_WIDTH_PX: u32 = 10;
/// Smallest scaled width for the logo inside a tile cell.
pub const MIN_TILE_LOGO_WIDTH_PX: u32 = 20;

/// Pixel quantities a layer needs, already resolved against the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Footprint {
    /// Text centered on `center`.
    Text {
        /// Font size in pixels.
        font_px: u32,
        /// Visual center, rounded to whole pixels.
        center: Point,
    },
    /// Logo scaled to `width_px` and centered on `center`.
    Logo {
        /// Target width in pixels; height follows the aspect ratio.
        width_px: u32,
        /// Requested center, rounded to whole pixels.
        center: Point,
    },
    /// Tiled text with glyphs of `font_px`.
    TiledText {
        /// Font size in pixels.
        font_px: u32,
    },
    /// Tiled logo whose content width is `width_px`.
    TiledLogo {
        /// Content width in pixels.
        width_px: u32,
    },
}

impl Footprint {
    /// Resolve `layer` against `canvas`.
    pub fn resolve(layer: &Layer, canvas: Canvas) -> Self {
        let center = || {
            let p = canvas.point_at_pct(layer.anchor.x_pct, layer.anchor.y_pct);
            Point::new(p.x.round(), p.y.round())
        };
        match layer.content() {
            Content::Text => Self::Text {
                font_px: canvas.width_pct_px(layer.size_pct, MIN_FONT_PX),
                center: center(),
            },
            Content::Logo => Self::Logo {
                width_px: canvas.width_pct_px(layer.size_pct, MIN_LOGO_WIDTH_PX),
                center: center(),
            },
            Content::TiledText => Self::TiledText {
                font_px: canvas.width_pct_px(layer.size_pct, MIN_FONT_PX),
            },
            Content::TiledLogo => Self::TiledLogo {
                width_px: canvas.width_pct_px(layer.size_pct, MIN_TILE_LOGO_WIDTH_PX),
            },
        }
    }
}

/// A layer paired with its resolved footprint.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedLayer<'a> {
    /// Position in the job's layer list.
    pub index: usize,
    /// The layer description.
    pub layer: &'a Layer,
    /// Pixel quantities.
    pub footprint: Footprint,
    /// Canvas the footprint was resolved against.
    pub canvas: Canvas,
}

impl<'a> ResolvedLayer<'a> {
    /// Resolve one layer.
    pub fn new(index: usize, layer: &'a Layer, canvas: Canvas) -> Self {
        Self {
            index,
            layer,
            footprint: Footprint::resolve(layer, canvas),
            canvas,
        }
    }

    /// Opacity as a `0..=1` multiplier.
    pub fn alpha(&self) -> f32 {
        self.layer.alpha()
    }
}

/// Every layer of a job resolved against the same canvas.
#[derive(Clone, Debug)]
pub struct ResolvedJob<'a> {
    /// Canvas discovered from the source media.
    pub canvas: Canvas,
    /// Layers in job order.
    pub layers: Vec<ResolvedLayer<'a>>,
}

impl ProcessingJob {
    /// Resolve every layer against `canvas`, once.
    pub fn resolve(&self, canvas: Canvas) -> ResolvedJob<'_> {
        ResolvedJob::new(&self.layers, canvas)
    }
}

impl<'a> ResolvedJob<'a> {
    /// Resolve a layer stack against `canvas`.
    pub fn new(layers: &'a [Layer], canvas: Canvas) -> Self {
        Self {
            canvas,
            layers: layers
                .iter()
                .enumerate()
                .map(|(idx, layer)| ResolvedLayer::new(idx, layer, canvas))
                .collect(),
        }
    }

    /// Layers in the stacking order chosen by `order`. The sort is stable, so layers of equal
    /// priority keep their job order.
    pub fn ordered(&self, order: LayerOrder) -> Vec<ResolvedLayer<'a>> {
        let mut layers = self.layers.clone();
        if order == LayerOrder::TypePriority {
            layers.sort_by_key(|l| l.layer.kind.priority());
        }
        layers
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/geometry.rs"]
mod tests;
