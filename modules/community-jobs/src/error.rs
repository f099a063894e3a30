use thiserror::Error;

use aws_client::AwsError;
use community_common::CommunityError;
use github_client::GithubError;
use meetup_client::MeetupError;
use twitter_client::TwitterError;

pub type Result<T> = std::result::Result<T, JobError>;

/// Errors that end a job run. Pages merged before the failure stay merged.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream API error: {0}")]
    Upstream(String),

    #[error("Unexpected response shape: {0}")]
    Schema(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Why a single URL could not be fetched. The link jobs log these and move on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("malformed: {0}")]
    Malformed(String),

    #[error("redirect loop at {0}")]
    RedirectLoop(String),
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchFailure::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            FetchFailure::Connect(err.to_string())
        } else if let Some(status) = err.status() {
            FetchFailure::Status(status.as_u16())
        } else {
            FetchFailure::Malformed(err.to_string())
        }
    }
}

impl From<neo4rs::Error> for JobError {
    fn from(err: neo4rs::Error) -> Self {
        JobError::Database(err.to_string())
    }
}

impl From<CommunityError> for JobError {
    fn from(err: CommunityError) -> Self {
        JobError::Config(err.to_string())
    }
}

impl From<TwitterError> for JobError {
    fn from(err: TwitterError) -> Self {
        match err {
            TwitterError::MissingToken => JobError::Config(err.to_string()),
            TwitterError::Parse(_) => JobError::Schema(err.to_string()),
            TwitterError::Network(_) | TwitterError::Api { .. } => {
                JobError::Upstream(err.to_string())
            }
        }
    }
}

impl From<GithubError> for JobError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::MissingToken => JobError::Config(err.to_string()),
            GithubError::Malformed(_) | GithubError::GraphQl(_) => {
                JobError::Schema(err.to_string())
            }
            GithubError::Network(_) | GithubError::Api { .. } => {
                JobError::Upstream(err.to_string())
            }
        }
    }
}

impl From<MeetupError> for JobError {
    fn from(err: MeetupError) -> Self {
        match err {
            MeetupError::MissingKey => JobError::Config(err.to_string()),
            MeetupError::Parse(_) => JobError::Schema(err.to_string()),
            MeetupError::Network(_) | MeetupError::Api { .. } => {
                JobError::Upstream(err.to_string())
            }
        }
    }
}

impl From<AwsError> for JobError {
    fn from(err: AwsError) -> Self {
        JobError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for JobError {
    fn from(err: std::io::Error) -> Self {
        JobError::Storage(err.to_string())
    }
}
