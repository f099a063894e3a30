pub mod config;
pub mod error;
pub mod secrets;

pub use config::{
    AwsConfig, GithubConfig, GraphConfig, MeetupConfig, SummaryConfig, TwitterConfig,
};
pub use error::CommunityError;
pub use secrets::{KmsSecrets, SecretResolver};
