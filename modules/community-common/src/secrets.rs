use async_trait::async_trait;
use aws_client::{AwsCredentials, KmsClient};
use tracing::debug;

use crate::error::{CommunityError, Result};

/// Turns an encrypted configuration value into its plaintext.
#[async_trait]
pub trait SecretResolver: Send + Sync {
    async fn resolve(&self, name: &str, ciphertext: &str) -> Result<String>;
}

/// Decrypts base64 KMS ciphertext blobs.
pub struct KmsSecrets {
    kms: KmsClient,
}

impl KmsSecrets {
    pub fn new(kms: KmsClient) -> Self {
        Self { kms }
    }

    /// Credentials from `AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY`.
    pub fn from_env(region: &str) -> Result<Self> {
        let credentials = AwsCredentials::from_env()?;
        Ok(Self::new(KmsClient::new(credentials, region)))
    }
}

#[async_trait]
impl SecretResolver for KmsSecrets {
    async fn resolve(&self, name: &str, ciphertext: &str) -> Result<String> {
        if ciphertext.trim().is_empty() {
            return Err(CommunityError::Config(format!("{name} is empty")));
        }
        let plaintext = self.kms.decrypt(ciphertext).await?;
        if plaintext.trim().is_empty() {
            return Err(CommunityError::Config(format!("{name} decrypted to an empty value")));
        }
        debug!(name, "Decrypted secret");
        Ok(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> KmsSecrets {
        KmsSecrets::new(KmsClient::new(
            AwsCredentials::new("AKIDEXAMPLE", "secret"),
            "us-east-1",
        ))
    }

    #[tokio::test]
    async fn empty_ciphertext_is_a_config_error() {
        let err = resolver().resolve("TWITTER_BEARER", "  ").await.unwrap_err();
        assert!(matches!(err, CommunityError::Config(ref m) if m == "TWITTER_BEARER is empty"));
    }

    #[tokio::test]
    async fn invalid_base64_fails_before_any_request() {
        let err = resolver().resolve("GITHUB_TOKEN", "not base64!").await.unwrap_err();
        assert!(matches!(err, CommunityError::Secret(aws_client::AwsError::Encoding(_))));
    }
}
