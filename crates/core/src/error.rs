/// Result alias that carries the custom [`StepGifError`] type.
pub type Result<T> = std::result::Result<T, StepGifError>;

/// Common error type for the core crate.
///
/// The chain and walker never fail; every variant here comes from the
/// collaborators around them (configuration, rasterising, encoding).
#[derive(Debug, thiserror::Error)]
pub enum StepGifError {
    /// Free-form message for failures that do not warrant their own variant.
    #[error("{0}")]
    Message(String),
    /// A configuration value was rejected by [`crate::AnimationConfig::validate`].
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The GIF encoder refused a frame or could not be set up.
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    /// A configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl StepGifError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn invalid_config<T: Into<String>>(msg: T) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
