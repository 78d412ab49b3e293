use thiserror::Error;

/// Every failure the upload, classification and histogram paths can surface.
///
/// The variants map one-to-one onto an HTTP status class; see
/// [`Error::status_code`]. Only `Validation` and `NotFound` messages are meant
/// for end users, the rest are logged and replaced by a generic message.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing input. User-correctable, nothing was written.
    #[error("{0}")]
    Validation(String),

    /// The referenced image or resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Disk I/O against the image store failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// The classifier failed or the model id is unknown.
    #[error("classification failed: {0}")]
    Classification(String),

    /// Histogram chart generation or encoding failed.
    #[error("render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }

    pub fn classification(msg: impl Into<String>) -> Self {
        Error::Classification(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Error::Render(msg.into())
    }

    /// HTTP status the boundary should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::NotFound(_) => 404,
            Error::Storage(_) | Error::Classification(_) | Error::Render(_) => 500,
        }
    }

    /// Message safe to show to the user. Server-side failures never leak
    /// their detail.
    pub fn public_message(&self) -> String {
        match self {
            Error::Validation(msg) | Error::NotFound(msg) => msg.clone(),
            Error::Storage(_) => "The image could not be stored. Please try again later.".into(),
            Error::Classification(_) => "The image could not be classified.".into(),
            Error::Render(_) => "The histogram could not be generated.".into(),
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}
