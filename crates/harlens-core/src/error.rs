use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read HAR file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error parsing HAR file: {0}")]
    MalformedInput(String),

    #[error("No entries found in HAR file")]
    EmptyCapture,

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
