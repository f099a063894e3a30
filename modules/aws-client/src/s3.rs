use crate::credentials::AwsCredentials;
use crate::error::{AwsError, Result};
use crate::sigv4::{self, SigningRequest};

/// S3 object upload over the REST API.
///
/// Uses virtual-hosted addressing (`<bucket>.s3.<region>.amazonaws.com`)
/// unless a custom endpoint is given (MinIO, LocalStack), which switches to
/// path-style addressing.
pub struct S3Client {
    client: reqwest::Client,
    credentials: AwsCredentials,
    region: String,
    endpoint: Option<String>,
}

impl S3Client {
    pub fn new(credentials: AwsCredentials, region: &str, endpoint: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            region: region.to_string(),
            endpoint: endpoint.map(|e| e.trim_end_matches('/').to_string()),
        }
    }

    /// Upload `body` to `s3://bucket/key`, replacing any existing object.
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let (url, host, canonical_uri) = self.object_location(bucket, key);
        let payload_hash = sigv4::hex_sha256(&body);

        let headers = sigv4::sign(
            &self.credentials,
            &SigningRequest {
                method: "PUT",
                host: &host,
                canonical_uri: &canonical_uri,
                query: &[],
                headers: &[
                    ("content-type", content_type),
                    ("x-amz-content-sha256", &payload_hash),
                ],
                payload: &body,
                region: &self.region,
                service: "s3",
            },
            chrono::Utc::now(),
        );

        let size = body.len();
        let mut req = self.client.put(&url).body(body);
        for (k, v) in &headers {
            req = req.header(k.as_str(), v.as_str());
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AwsError::Api {
                status: status.as_u16(),
                message: message.chars().take(500).collect(),
            });
        }

        tracing::info!(bucket, key, bytes = size, "Uploaded object to S3");
        Ok(())
    }

    /// Returns (request URL, host header, canonical URI).
    fn object_location(&self, bucket: &str, key: &str) -> (String, String, String) {
        let encoded_key = sigv4::uri_encode_path(key.trim_start_matches('/'));
        match self.endpoint {
            Some(ref endpoint) => {
                let host = endpoint
                    .trim_start_matches("https://")
                    .trim_start_matches("http://")
                    .to_string();
                let canonical_uri = format!("/{bucket}/{encoded_key}");
                (format!("{endpoint}{canonical_uri}"), host, canonical_uri)
            }
            None => {
                let host = format!("{bucket}.s3.{}.amazonaws.com", self.region);
                let canonical_uri = format!("/{encoded_key}");
                (format!("https://{host}{canonical_uri}"), host, canonical_uri)
            }
        }
    }
}
