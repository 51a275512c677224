//! ffmpeg `-filter_complex` construction.
//!
//! Input 0 is always the source. Tiled and text layers are rasterized to canvas-sized PNGs and
//! overlaid at the origin; logos are fed to ffmpeg directly and scaled, faded and positioned by
//! the graph itself.

use std::path::PathBuf;

use crate::composite::blend::over_at;
use crate::foundation::core::{Canvas, PixelPoint, PremulImage};
use crate::foundation::error::OvermarkResult;
use crate::layer::geometry::{Footprint, ResolvedJob, ResolvedLayer};
use crate::layer::model::LayerOrder;
use crate::raster::logo::load_logo;
use crate::raster::rasterizer::{RasterizedLayer, Rasterizer};
use crate::video::temp::TempArtifacts;

/// Extra inputs plus the filter chains that stack them over the source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterGraph {
    /// Extra `-i` inputs, in order; the first one is ffmpeg input 1.
    pub inputs: Vec<PathBuf>,
    /// One chain per stage, joined with `;` for `-filter_complex`.
    pub chains: Vec<String>,
    /// Label of the last stage's output, without brackets.
    pub output_label: Option<String>,
}

impl FilterGraph {
    /// `true` when no layer produced a stage.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// The `-filter_complex` argument.
    pub fn filter_complex(&self) -> String {
        self.chains.join(";")
    }

    fn current_label(&self) -> String {
        self.output_label.clone().unwrap_or_else(|| "0:v".to_owned())
    }

    fn push_input(&mut self, path: PathBuf) -> usize {
        self.inputs.push(path);
        self.inputs.len()
    }

    /// `[cur][input]overlay=0:0[vN]`
    fn push_full_canvas(&mut self, path: PathBuf) {
        let cur = self.current_label();
        let input = self.push_input(path);
        let out = format!("v{input}");
        self.chains.push(format!("[{cur}][{input}:v]overlay=0:0[{out}]"));
        self.output_label = Some(out);
    }

    /// Scale, fade and center a logo input on a percentage anchor.
    fn push_logo(&mut self, path: PathBuf, width_px: u32, opacity: f64, x: f64, y: f64) {
        let cur = self.current_label();
        let input = self.push_input(path);
        let logo = format!("logo{input}");
        let out = format!("v{input}");

        self.chains.push(format!(
            "[{input}:v]scale={width_px}:-1,format=rgba,colorchannelmixer=aa={opacity}[{logo}]"
        ));
        self.chains.push(format!(
            "[{cur}][{logo}]overlay=x=(W*{x})-(w/2):y=(H*{y})-(h/2)[{out}]"
        ));
        self.output_label = Some(out);
    }
}

/// Draw a layer raster onto a transparent canvas-sized buffer unless it already is one.
fn flatten_to_canvas(raster: RasterizedLayer, canvas: Canvas) -> PremulImage {
    let top_left = raster.top_left();
    let image = match raster {
        RasterizedLayer::Positioned { image, .. } | RasterizedLayer::FullCanvas(image) => image,
    };
    if top_left == PixelPoint::ORIGIN && image.size() == canvas {
        return image;
    }
    let mut out = PremulImage::transparent(canvas.width, canvas.height);
    over_at(&mut out, &image, top_left);
    out
}

fn push_layer(
    graph: &mut FilterGraph,
    layer: &ResolvedLayer<'_>,
    rasterizer: &Rasterizer,
    temps: &mut TempArtifacts,
) -> OvermarkResult<()> {
    let name = layer.layer.content().name();
    match layer.footprint {
        Footprint::Logo { width_px, .. } => {
            let asset = layer.layer.asset()?;
            // ffmpeg would only fail mid-transcode; fail now with an asset error instead.
            load_logo(asset)?;
            graph.push_logo(
                asset.to_path_buf(),
                width_px,
                layer.layer.opacity_pct / 100.0,
                layer.layer.anchor.x_pct / 100.0,
                layer.layer.anchor.y_pct / 100.0,
            );
        }
        Footprint::Text { .. } | Footprint::TiledText { .. } | Footprint::TiledLogo { .. } => {
            let raster = rasterizer.rasterize_resolved(layer)?;
            let flat = flatten_to_canvas(raster, layer.canvas);
            let path = temps.write_png(name, &flat)?;
            graph.push_full_canvas(path);
        }
    }
    tracing::debug!(
        layer = layer.index,
        kind = name,
        stage = graph.chains.last().map(String::as_str).unwrap_or_default(),
        "added filter stage"
    );
    Ok(())
}

/// Build the filter graph for `resolved`, stacking layers in `order`.
///
/// Any layer failure aborts: a graph with a missing stage cannot run partially.
pub fn build_filter_graph(
    resolved: &ResolvedJob<'_>,
    order: LayerOrder,
    rasterizer: &Rasterizer,
    temps: &mut TempArtifacts,
) -> OvermarkResult<FilterGraph> {
    let mut graph = FilterGraph::default();
    for layer in resolved.ordered(order) {
        push_layer(&mut graph, &layer, rasterizer, temps)?;
    }
    Ok(graph)
}

#[cfg(test)]
#[path = "../../tests/unit/video/filter_graph.rs"]
mod tests;
