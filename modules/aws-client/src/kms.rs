use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::credentials::AwsCredentials;
use crate::error::{AwsError, Result};
use crate::sigv4::{self, SigningRequest};

const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// KMS JSON-protocol client. Only the two calls the jobs need.
pub struct KmsClient {
    client: reqwest::Client,
    credentials: AwsCredentials,
    region: String,
    host: String,
}

#[derive(Debug, Deserialize)]
struct DecryptResponse {
    #[serde(rename = "Plaintext")]
    plaintext: String,
}

#[derive(Debug, Deserialize)]
struct EncryptResponse {
    #[serde(rename = "CiphertextBlob")]
    ciphertext_blob: String,
}

impl KmsClient {
    pub fn new(credentials: AwsCredentials, region: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            region: region.to_string(),
            host: format!("kms.{region}.amazonaws.com"),
        }
    }

    /// Decrypt a base64 ciphertext blob into its UTF-8 plaintext.
    pub async fn decrypt(&self, ciphertext_b64: &str) -> Result<String> {
        let ciphertext_b64 = ciphertext_b64.trim();
        // KMS takes the blob base64-encoded; reject garbage before the round trip.
        STANDARD.decode(ciphertext_b64)?;

        let resp: DecryptResponse = self
            .call(
                "TrentService.Decrypt",
                json!({ "CiphertextBlob": ciphertext_b64 }),
            )
            .await?;

        let bytes = STANDARD.decode(resp.plaintext.as_bytes())?;
        String::from_utf8(bytes).map_err(|e| AwsError::Encoding(e.to_string()))
    }

    /// Encrypt `plaintext` under `key_id`, returning the base64 ciphertext blob.
    pub async fn encrypt(&self, key_id: &str, plaintext: &str) -> Result<String> {
        let resp: EncryptResponse = self
            .call(
                "TrentService.Encrypt",
                json!({
                    "KeyId": key_id,
                    "Plaintext": STANDARD.encode(plaintext.as_bytes()),
                }),
            )
            .await?;
        Ok(resp.ciphertext_blob)
    }

    async fn call<T: DeserializeOwned>(&self, target: &str, body: serde_json::Value) -> Result<T> {
        let payload = serde_json::to_vec(&body)?;
        let headers = sigv4::sign(
            &self.credentials,
            &SigningRequest {
                method: "POST",
                host: &self.host,
                canonical_uri: "/",
                query: &[],
                headers: &[("content-type", CONTENT_TYPE), ("x-amz-target", target)],
                payload: &payload,
                region: &self.region,
                service: "kms",
            },
            chrono::Utc::now(),
        );

        let mut req = self
            .client
            .post(format!("https://{}/", self.host))
            .body(payload);
        for (k, v) in &headers {
            req = req.header(k.as_str(), v.as_str());
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(AwsError::Api {
                status: status.as_u16(),
                message: text.chars().take(500).collect(),
            });
        }

        tracing::debug!(operation = target, "KMS call succeeded");
        Ok(serde_json::from_str(&text)?)
    }
}
