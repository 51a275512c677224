/// Crate-wide result alias.
pub type OvermarkResult<T> = Result<T, OvermarkError>;

/// Errors raised by layer validation, rasterization, compositing and transcoding.
#[derive(thiserror::Error, Debug)]
pub enum OvermarkError {
    /// A layer or job field is missing or out of range.
    #[error("validation error: {0}")]
    Validation(String),

    /// A logo asset could not be read or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// The source video could not be probed or has no video stream.
    #[error("probe error: {0}")]
    Probe(String),

    /// The source still image could not be read or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Writing the output (image encode or ffmpeg transcode) failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// A job or settings document could not be parsed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, usually filesystem IO with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OvermarkError {
    /// Build a [`OvermarkError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`OvermarkError::Asset`].
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`OvermarkError::Probe`].
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Build a [`OvermarkError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`OvermarkError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`OvermarkError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` when the failure concerns a single layer's content and the rest of the
    /// job can still proceed (still-image path only).
    pub fn is_layer_local(&self) -> bool {
        matches!(self, Self::Asset(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
