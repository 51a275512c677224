//! SVG documents for text layers.
//!
//! Text is laid out by `usvg` with `text-anchor="middle"` and `dominant-baseline="middle"`, so
//! the given point is the visual center of the rendered line.

use crate::foundation::core::{Affine, Canvas, Point, svg_matrix};
use crate::layer::color::Color;

/// Appearance shared by every text element we emit.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TextStyle<'a> {
    pub(crate) text: &'a str,
    pub(crate) font_px: u32,
    pub(crate) color: Color,
    pub(crate) alpha: f32,
    pub(crate) family: &'a str,
}

/// Escape text for use inside XML character data and attribute values.
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() && c != '\t' => {}
            c => out.push(c),
        }
    }
    out
}

fn text_element(style: &TextStyle<'_>, at: Point, transform: Option<Affine>) -> String {
    let transform = transform
        .map(|t| format!(r#" transform="{}""#, svg_matrix(t)))
        .unwrap_or_default();
    format!(
        concat!(
            r#"<text x="{x}" y="{y}" text-anchor="middle" dominant-baseline="middle"{transform}"#,
            r#" fill="{fill}" fill-opacity="{fill_opacity}" opacity="{opacity}""#,
            r#" font-size="{size}" font-weight="bold" font-family="{family}">{text}</text>"#,
        ),
        x = at.x,
        y = at.y,
        transform = transform,
        fill = style.color.to_hex_rgb(),
        fill_opacity = style.color.alpha(),
        opacity = style.alpha,
        size = style.font_px,
        family = escape_xml(style.family),
        text = escape_xml(style.text),
    )
}

fn document(width: u32, height: u32, body: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">{body}</svg>"#
    )
}

/// Full-canvas document with one line of text centered on `center`.
pub(crate) fn canvas_text_svg(canvas: Canvas, style: &TextStyle<'_>, center: Point) -> String {
    document(
        canvas.width,
        canvas.height,
        &text_element(style, center, None),
    )
}

/// Tile-cell document with the text centered and turned by `rotation`.
pub(crate) fn tile_text_svg(
    tile_w: u32,
    tile_h: u32,
    style: &TextStyle<'_>,
    rotation: Affine,
) -> String {
    let center = Point::new(f64::from(tile_w) / 2.0, f64::from(tile_h) / 2.0);
    document(tile_w, tile_h, &text_element(style, center, Some(rotation)))
}

#[cfg(test)]
#[path = "../../tests/unit/raster/text.rs"]
mod tests;
