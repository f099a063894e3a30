use thiserror::Error;

pub type Result<T> = std::result::Result<T, GithubError>;

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("No GitHub token configured")]
    MissingToken,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for GithubError {
    fn from(err: reqwest::Error) -> Self {
        GithubError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for GithubError {
    fn from(err: serde_json::Error) -> Self {
        GithubError::Malformed(err.to_string())
    }
}
