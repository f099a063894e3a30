use thiserror::Error;

pub type Result<T> = std::result::Result<T, CommunityError>;

#[derive(Error, Debug)]
pub enum CommunityError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Secret decryption failed: {0}")]
    Secret(#[from] aws_client::AwsError),
}
