use thiserror::Error;

pub type Result<T> = std::result::Result<T, AwsError>;

#[derive(Debug, Error)]
pub enum AwsError {
    #[error("Missing credentials: {0}")]
    Credentials(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl From<reqwest::Error> for AwsError {
    fn from(err: reqwest::Error) -> Self {
        AwsError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AwsError {
    fn from(err: serde_json::Error) -> Self {
        AwsError::Parse(err.to_string())
    }
}

impl From<base64::DecodeError> for AwsError {
    fn from(err: base64::DecodeError) -> Self {
        AwsError::Encoding(err.to_string())
    }
}
