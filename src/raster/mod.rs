//! Turning layer descriptions into pixels.

pub(crate) mod logo;
pub(crate) mod rasterizer;
pub(crate) mod svg;
pub(crate) mod text;
pub(crate) mod tile;

/// Largest edge, in pixels, of any intermediate raster.
pub const MAX_RASTER_DIM: u32 = 16_384;
