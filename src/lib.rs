//! Overmark stamps watermark layers onto still images and videos.
//!
//! A [`ProcessingJob`] is a source path plus an ordered list of [`Layer`]s (text, logo, or a
//! tiled pattern of either). Every percentage in a layer resolves against the source's pixel
//! size once per job:
//!
//! - Still images are decoded, composited in-process back to front, and re-encoded.
//! - Videos get an ffmpeg `-filter_complex` graph that overlays each layer; audio is copied.
//!
//! [`Engine`] loads fonts once and processes any number of jobs.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod composite;
pub(crate) mod job;
pub(crate) mod layer;
pub(crate) mod raster;
pub(crate) mod video;

pub use crate::foundation::core::{Affine, Canvas, PixelPoint, Point, PremulImage};
pub use crate::foundation::error::{OvermarkError, OvermarkResult};

pub use crate::composite::blend::{PremulRgba8, over, over_at};
pub use crate::composite::image::{compose, compose_image_bytes, compose_image_file};
pub use crate::job::{
    Engine, EngineOpts, IMAGE_EXTENSIONS, MediaKind, VIDEO_EXTENSIONS, output_path_for,
    process_job,
};
pub use crate::layer::color::Color;
pub use crate::layer::geometry::{Footprint, ResolvedJob, ResolvedLayer};
pub use crate::layer::model::{
    Anchor, Content, DEFAULT_TEXT, Layer, LayerKind, LayerOrder, ProcessingJob, TiledKind,
    validate_layers,
};
pub use crate::raster::rasterizer::{RasterOpts, RasterizedLayer, Rasterizer};
pub use crate::raster::svg::FontOpts;
pub use crate::raster::tile::TilePeriod;
pub use crate::video::filter_graph::{FilterGraph, build_filter_graph};
pub use crate::video::probe::{VideoInfo, parse_probe_json, probe_video};
pub use crate::video::temp::{PartialOutput, TempArtifacts};
pub use crate::video::transcode::{
    VideoOpts, ffmpeg_args, is_ffmpeg_on_path, is_tool_available, transcode_video,
};

/// Re-exported so callers can pick a logo resampling filter without depending on `image`.
pub use image::imageops::FilterType;
/// Re-exported so callers can name an encode format for [`compose_image_bytes`].
pub use image::ImageFormat;
