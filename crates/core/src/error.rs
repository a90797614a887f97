/// Result alias that carries the custom [`PlayerError`] type.
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Common error type for the core crate.
///
/// The controller itself never returns these; they describe failures of the
/// collaborators around it (decoders, fetchers, configuration) and are turned
/// into error events once they reach a load.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// Free-form message, mostly used by hosts.
    #[error("{0}")]
    Message(String),
    /// The score bytes could not be decoded.
    #[error("decode failed: {0}")]
    Decode(String),
    /// The score could not be retrieved.
    #[error("fetch failed: {0}")]
    Fetch(String),
    /// Invalid player configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl PlayerError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for PlayerError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for PlayerError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
