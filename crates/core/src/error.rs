/// Result alias that carries the custom [`ExchangeError`] type.
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// The decomposition order is zero, too large for a frame to exist, or
    /// exceeds the highest order a selected legacy numbering defines.
    #[error("invalid decomposition order {order}: {reason}")]
    InvalidOrder { order: usize, reason: &'static str },
    /// A harmonic degree above the decomposition order was requested.
    #[error("harmonic degree {degree} exceeds decomposition order {order}")]
    InvalidDegree { degree: usize, order: usize },
    /// A caller-supplied frame buffer holds fewer samples than the layout has
    /// channels.
    #[error("buffer too small: {needed} samples needed, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A multi-frame buffer does not hold a whole number of frames.
    #[error("buffer of {len} samples is not a whole number of {channels}-channel frames")]
    PartialFrame { len: usize, channels: usize },
    /// A textual mode name did not match any known mode.
    #[error("unknown mode `{0}`")]
    UnknownMode(String),
    /// Free-form failure reported by the application layer.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around JSON (de)serialization errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl ExchangeError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for ExchangeError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for ExchangeError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
