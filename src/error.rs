use thiserror::Error;

#[derive(Error, Debug)]
pub enum PTZError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Read error: {0}")]
    ReadError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Request rejected with status {status}: {body}")]
    RequestRejected { status: u16, body: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<reqwest::Error> for PTZError {
    fn from(e: reqwest::Error) -> Self {
        PTZError::ConnectionError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PTZError>;
