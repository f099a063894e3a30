use thiserror::Error;

pub type Result<T> = std::result::Result<T, MeetupError>;

#[derive(Debug, Error)]
pub enum MeetupError {
    #[error("No Meetup API key configured")]
    MissingKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for MeetupError {
    fn from(err: reqwest::Error) -> Self {
        MeetupError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for MeetupError {
    fn from(err: serde_json::Error) -> Self {
        MeetupError::Parse(err.to_string())
    }
}
