pub mod credentials;
pub mod error;
pub mod kms;
pub mod s3;
pub mod sigv4;

pub use credentials::AwsCredentials;
pub use error::{AwsError, Result};
pub use kms::KmsClient;
pub use s3::S3Client;

/// Region used when `AWS_REGION` is not set.
pub const DEFAULT_REGION: &str = "us-east-1";
