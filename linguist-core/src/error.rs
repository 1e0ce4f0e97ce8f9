pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// Malformed catalog text. `position` is a byte offset into the input.
    #[error("parse error at byte {position}: {message}")]
    Parse { position: u64, message: String },
    #[error("encoding: {0}")]
    Encoding(String),
    #[error("invalid: {0}")]
    Invalid(String),
}

impl Error {
    pub fn parse(position: u64, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
