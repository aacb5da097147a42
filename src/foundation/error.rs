/// Convenience result type used across Storyframe.
pub type StoryframeResult<T> = Result<T, StoryframeError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Most of these never reach the host: decode failures are logged and leave the affected asset
/// unset. They surface from the lower-level building blocks (`decode_image`, `encode_png`,
/// config loading) and from the CLI.
#[derive(thiserror::Error, Debug)]
pub enum StoryframeError {
    /// Invalid user-provided configuration or input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An image source could not be read or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The drawing surface could not be created or drawn to.
    #[error("render error: {0}")]
    Render(String),

    /// The composite could not be encoded to an image buffer.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryframeError {
    /// Build a [`StoryframeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StoryframeError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`StoryframeError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StoryframeError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
