use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::layer::color::Color;

/// Text used when a text layer has no (or blank) text.
pub const DEFAULT_TEXT: &str = "Watermark";

/// Top-level kind of a watermark layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Free text anchored at a point.
    #[default]
    Text,
    /// Raster logo anchored at a point.
    Logo,
    /// Diagonal repeating pattern covering the whole canvas.
    Tiled,
}

impl LayerKind {
    /// Filter-graph priority: tiled layers first, then text, then logos.
    pub fn priority(self) -> u8 {
        match self {
            Self::Tiled => 1,
            Self::Text => 2,
            Self::Logo => 3,
        }
    }
}

/// What a [`LayerKind::Tiled`] layer repeats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TiledKind {
    /// Repeat rendered text.
    #[default]
    Text,
    /// Repeat a scaled logo.
    #[serde(alias = "image")]
    Logo,
}

/// The four concrete things a layer can draw, after folding `tiledKind` into `kind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Content {
    /// See [`LayerKind::Text`].
    Text,
    /// See [`LayerKind::Logo`].
    Logo,
    /// Tiled text pattern.
    TiledText,
    /// Tiled logo pattern.
    TiledLogo,
}

impl Content {
    /// `true` for kinds that read an image asset.
    pub fn needs_asset(self) -> bool {
        matches!(self, Self::Logo | Self::TiledLogo)
    }

    /// `true` for kinds that cover the full canvas and ignore the anchor.
    pub fn is_tiled(self) -> bool {
        matches!(self, Self::TiledText | Self::TiledLogo)
    }

    /// Short name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Logo => "logo",
            Self::TiledText => "tiled-text",
            Self::TiledLogo => "tiled-logo",
        }
    }
}

/// Center point of a layer as percentages of canvas width/height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Horizontal center, `0..=100`.
    #[serde(rename = "x", alias = "xPct")]
    pub x_pct: f64,
    /// Vertical center, `0..=100`.
    #[serde(rename = "y", alias = "yPct")]
    pub y_pct: f64,
}

impl Anchor {
    /// Create an anchor.
    pub fn new(x_pct: f64, y_pct: f64) -> Self {
        Self { x_pct, y_pct }
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Self::new(50.0, 50.0)
    }
}

fn default_text() -> String {
    DEFAULT_TEXT.to_owned()
}

fn default_size_pct() -> f64 {
    5.0
}

fn default_opacity_pct() -> f64 {
    50.0
}

/// One watermark instruction.
///
/// Field names on the wire follow the settings blob sent by upload forms (`type`, `size`,
/// `opacity`, `position`, `path`); the descriptive names are accepted as aliases.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Top-level kind.
    #[serde(rename = "type", alias = "kind", default)]
    pub kind: LayerKind,
    /// Sub-kind, only read for [`LayerKind::Tiled`].
    #[serde(rename = "tiledType", alias = "tiledKind", default)]
    pub tiled_kind: TiledKind,
    /// Text for text kinds.
    #[serde(default = "default_text")]
    pub text: String,
    /// Fill color for text kinds: `#RGB`, `#RRGGBB`, `#RRGGBBAA`, a CSS color name or
    /// `rgb()`/`rgba()`, or an `[r, g, b(, a)]` array of `0..=1` channels.
    #[serde(default)]
    pub color: Color,
    /// Size as a percentage of canvas width.
    #[serde(rename = "size", alias = "sizePct", default = "default_size_pct")]
    pub size_pct: f64,
    /// Opacity, `0..=100`.
    #[serde(rename = "opacity", alias = "opacityPct", default = "default_opacity_pct")]
    pub opacity_pct: f64,
    /// Center point; ignored by tiled kinds.
    #[serde(rename = "position", alias = "anchor", default)]
    pub anchor: Anchor,
    /// Image asset for logo kinds.
    #[serde(
        rename = "path",
        alias = "assetPath",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub asset_path: Option<PathBuf>,
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            kind: LayerKind::Text,
            tiled_kind: TiledKind::Text,
            text: default_text(),
            color: Color::WHITE,
            size_pct: default_size_pct(),
            opacity_pct: default_opacity_pct(),
            anchor: Anchor::default(),
            asset_path: None,
        }
    }
}

impl Layer {
    /// Text layer.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Logo layer reading `asset`.
    pub fn logo(asset: impl Into<PathBuf>) -> Self {
        Self {
            kind: LayerKind::Logo,
            asset_path: Some(asset.into()),
            ..Self::default()
        }
    }

    /// Tiled text pattern.
    pub fn tiled_text(text: impl Into<String>) -> Self {
        Self {
            kind: LayerKind::Tiled,
            tiled_kind: TiledKind::Text,
            text: text.into(),
            ..Self::default()
        }
    }

    /// Tiled logo pattern reading `asset`.
    pub fn tiled_logo(asset: impl Into<PathBuf>) -> Self {
        Self {
            kind: LayerKind::Tiled,
            tiled_kind: TiledKind::Logo,
            asset_path: Some(asset.into()),
            ..Self::default()
        }
    }

    /// Set the size percentage.
    pub fn with_size_pct(mut self, size_pct: f64) -> Self {
        self.size_pct = size_pct;
        self
    }

    /// Set the opacity percentage.
    pub fn with_opacity_pct(mut self, opacity_pct: f64) -> Self {
        self.opacity_pct = opacity_pct;
        self
    }

    /// Set the anchor.
    pub fn with_anchor(mut self, x_pct: f64, y_pct: f64) -> Self {
        self.anchor = Anchor::new(x_pct, y_pct);
        self
    }

    /// Set the text color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Fold `kind` and `tiled_kind` into the concrete content kind.
    pub fn content(&self) -> Content {
        match (self.kind, self.tiled_kind) {
            (LayerKind::Text, _) => Content::Text,
            (LayerKind::Logo, _) => Content::Logo,
            (LayerKind::Tiled, TiledKind::Text) => Content::TiledText,
            (LayerKind::Tiled, TiledKind::Logo) => Content::TiledLogo,
        }
    }

    /// Text to render, falling back to [`DEFAULT_TEXT`] when blank.
    pub fn display_text(&self) -> &str {
        if self.text.trim().is_empty() {
            DEFAULT_TEXT
        } else {
            &self.text
        }
    }

    /// Opacity as a `0..=1` alpha multiplier.
    pub fn alpha(&self) -> f32 {
        (self.opacity_pct / 100.0).clamp(0.0, 1.0) as f32
    }

    /// Asset path of a logo kind. Errors for layers that have none.
    pub fn asset(&self) -> OvermarkResult<&Path> {
        self.asset_path.as_deref().ok_or_else(|| {
            OvermarkError::validation(format!(
                "{} layer requires an asset path",
                self.content().name()
            ))
        })
    }

    /// Check every field before any rasterization happens.
    pub fn validate(&self) -> OvermarkResult<()> {
        let content = self.content();

        if !self.size_pct.is_finite() || self.size_pct <= 0.0 {
            return Err(OvermarkError::validation(format!(
                "size must be a positive number, got {}",
                self.size_pct
            )));
        }
        if !self.opacity_pct.is_finite() || !(0.0..=100.0).contains(&self.opacity_pct) {
            return Err(OvermarkError::validation(format!(
                "opacity must be within 0..=100, got {}",
                self.opacity_pct
            )));
        }
        if !content.is_tiled() {
            for (axis, v) in [("x", self.anchor.x_pct), ("y", self.anchor.y_pct)] {
                if !v.is_finite() || !(0.0..=100.0).contains(&v) {
                    return Err(OvermarkError::validation(format!(
                        "position.{axis} must be within 0..=100, got {v}"
                    )));
                }
            }
        }

        if content.needs_asset() {
            let path = self.asset()?;
            if path.as_os_str().is_empty() {
                return Err(OvermarkError::validation(format!(
                    "{} layer requires an asset path",
                    content.name()
                )));
            }
            if !path.is_file() {
                return Err(OvermarkError::validation(format!(
                    "asset '{}' does not exist or is not a file",
                    path.display()
                )));
            }
            std::fs::File::open(path).map_err(|e| {
                OvermarkError::validation(format!(
                    "asset '{}' is not readable: {e}",
                    path.display()
                ))
            })?;
        }

        Ok(())
    }
}

/// Order in which the video path stacks layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerOrder {
    /// Stable sort by [`LayerKind::priority`]: tiled, text, logo.
    #[default]
    TypePriority,
    /// Keep the job's layer order, same as the still-image path.
    Input,
}

/// Source media plus the ordered layer stack; layer 0 is drawn first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessingJob {
    /// Media to watermark.
    pub source_path: PathBuf,
    /// Layers, back to front.
    pub layers: Vec<Layer>,
}

impl ProcessingJob {
    /// Create a job.
    pub fn new(source_path: impl Into<PathBuf>, layers: Vec<Layer>) -> Self {
        Self {
            source_path: source_path.into(),
            layers,
        }
    }

    /// Parse a settings JSON document for `source_path`.
    ///
    /// The document is either `{"layers": [...]}` or one bare layer object.
    pub fn from_settings_json(
        source_path: impl Into<PathBuf>,
        json: &str,
    ) -> OvermarkResult<Self> {
        let invalid =
            |e: serde_json::Error| OvermarkError::serde(format!("invalid layer settings: {e}"));

        let mut doc: serde_json::Value = serde_json::from_str(json).map_err(invalid)?;
        let layers = match doc.as_object_mut().and_then(|o| o.remove("layers")) {
            Some(list) => serde_json::from_value::<Vec<Layer>>(list).map_err(invalid)?,
            None => vec![serde_json::from_value::<Layer>(doc).map_err(invalid)?],
        };
        Ok(Self::new(source_path, layers))
    }

    /// Make relative asset paths relative to `base_dir`.
    pub fn resolve_assets_against(mut self, base_dir: &Path) -> Self {
        for layer in &mut self.layers {
            if let Some(p) = layer.asset_path.as_mut()
                && p.is_relative()
            {
                *p = base_dir.join(&*p);
            }
        }
        self
    }

    /// Validate every layer, reporting the first failure with its index.
    pub fn validate(&self) -> OvermarkResult<()> {
        validate_layers(&self.layers)
    }
}

/// Validate a layer stack, reporting the first failure with its index.
pub fn validate_layers(layers: &[Layer]) -> OvermarkResult<()> {
    for (idx, layer) in layers.iter().enumerate() {
        layer.validate().map_err(|e| match e {
            OvermarkError::Validation(msg) => {
                OvermarkError::validation(format!("layer {idx}: {msg}"))
            }
            other => other,
        })?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/layer/model.rs"]
mod tests;
