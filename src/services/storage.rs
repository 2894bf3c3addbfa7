//! Object storage gateway (S3-compatible buckets)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::{Client, Url};
use sha2::{Digest, Sha256};

use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
};

type HmacSha256 = Hmac<Sha256>;

/// Stores a payload under a key and returns its retrieval URL
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, payload: Vec<u8>, key: &str, content_type: &str) -> AppResult<String>;
}

#[derive(Clone)]
pub struct S3ObjectStore {
    config: StorageConfig,
    client: Client,
}

impl S3ObjectStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Public URL of `key`. Readability depends on the bucket policy.
    pub fn object_url(&self, key: &str) -> String {
        format!(
            "https://{}.{}/{}",
            self.config.bucket_name,
            self.config.provider_host,
            encode_key(key)
        )
    }

    fn write_url(&self, key: &str) -> AppResult<Url> {
        let raw = match &self.config.endpoint {
            Some(endpoint) => format!(
                "{}/{}/{}",
                endpoint.trim_end_matches('/'),
                self.config.bucket_name,
                encode_key(key)
            ),
            None => self.object_url(key),
        };
        Url::parse(&raw).map_err(|e| AppError::Internal(format!("Invalid storage URL: {}", e)))
    }

    /// AWS Signature V4 headers for a single-chunk PUT
    fn signed_headers(
        &self,
        url: &Url,
        payload: &[u8],
        content_type: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<(&'static str, String)>> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let payload_hash = hex::encode(Sha256::digest(payload));

        let host = match url.port() {
            Some(port) => format!("{}:{}", url.host_str().unwrap_or_default(), port),
            None => url.host_str().unwrap_or_default().to_string(),
        };

        let signed_header_names = "content-type;host;x-amz-content-sha256;x-amz-date";
        let canonical_request = format!(
            "PUT\n{}\n\ncontent-type:{}\nhost:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n\n{}\n{}",
            url.path(),
            content_type,
            host,
            payload_hash,
            amz_date,
            signed_header_names,
            payload_hash
        );

        let scope = format!("{}/{}/s3/aws4_request", date, self.config.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let signing_key = [date.as_str(), self.config.region.as_str(), "s3", "aws4_request"]
            .iter()
            .try_fold(
                format!("AWS4{}", self.config.secret_key).into_bytes(),
                |key, part| hmac_sha256(&key, part.as_bytes()),
            )?;
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

        Ok(vec![
            (
                "authorization",
                format!(
                    "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
                    self.config.access_key, scope, signed_header_names, signature
                ),
            ),
            ("content-type", content_type.to_string()),
            ("x-amz-content-sha256", payload_hash),
            ("x-amz-date", amz_date),
        ])
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, payload: Vec<u8>, key: &str, content_type: &str) -> AppResult<String> {
        let url = self.write_url(key)?;
        let headers = self.signed_headers(&url, &payload, content_type, Utc::now())?;
        let size = payload.len();

        let mut request = self.client.put(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request
            .body(payload)
            .send()
            .await
            .map_err(|e| AppError::StorageUnavailable(format!("upload of '{}' failed: {}", key, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::StorageUnavailable(format!(
                "upload of '{}' rejected with {}: {}",
                key, status, body
            )));
        }

        tracing::debug!(key, size, content_type, "Object stored");
        Ok(self.object_url(key))
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> AppResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(format!("Invalid signing key: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Percent-encode an object key, keeping `/` as the path separator
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
