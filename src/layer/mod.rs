pub(crate) mod color;
pub(crate) mod geometry;
pub(crate) mod model;
