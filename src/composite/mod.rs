pub(crate) mod blend;
pub(crate) mod image;
