//! Cloudinary implementation of the [`ImageStore`] port.
//!
//! Uses signed uploads: the signature is the SHA-256 hex digest of the
//! alphabetically sorted parameters followed by the API secret, and the
//! request declares `signature_algorithm=sha256`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{ImageStore, ImageStoreError, ImageUpload};
use crate::outbound::http_support::{body_preview, client};

const API_BASE: &str = "https://api.cloudinary.com/v1_1/";

/// Account settings for [`CloudinaryImageStore`].
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: Zeroizing<String>,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Uploads images to a Cloudinary account.
pub struct CloudinaryImageStore {
    client: Client,
    endpoint: Url,
    api_key: String,
    api_secret: Zeroizing<String>,
    clock: Arc<dyn Clock>,
}

impl CloudinaryImageStore {
    /// Build the store and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the cloud name does not form a valid
    /// URL or the client cannot be constructed.
    pub fn new(config: CloudinaryConfig, clock: Arc<dyn Clock>) -> Result<Self, ImageStoreError> {
        let endpoint = Url::parse(API_BASE)
            .and_then(|base| base.join(&format!("{}/image/upload", config.cloud_name.trim())))
            .map_err(|err| ImageStoreError::transport(format!("invalid cloud name: {err}")))?;
        let client =
            client(config.timeout).map_err(|err| ImageStoreError::transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key,
            api_secret: config.api_secret,
            clock,
        })
    }
}

/// Signature over the signed parameters, which must already be sorted by name.
fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let joined = params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    hex::encode(Sha256::digest(format!("{joined}{secret}").as_bytes()))
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    async fn upload(&self, image: &ImageUpload) -> Result<String, ImageStoreError> {
        let timestamp = self.clock.utc().timestamp().to_string();
        let folder = image.folder().as_str();
        let signature = sign(
            &[("folder", folder), ("timestamp", timestamp.as_str())],
            self.api_secret.as_str(),
        );
        let file = Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_owned())
            .mime_str(image.content_type())
            .map_err(|err| ImageStoreError::transport(err.to_string()))?;
        let form = Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("folder", folder)
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|err| ImageStoreError::transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| ImageStoreError::transport(err.to_string()))?;
        if !status.is_success() {
            return Err(ImageStoreError::rejected(status.as_u16(), body_preview(&body)));
        }
        let decoded: UploadResponse = serde_json::from_slice(&body)
            .map_err(|err| ImageStoreError::transport(format!("invalid upload response: {err}")))?;
        debug!(folder, url = %decoded.secure_url, "image uploaded");
        Ok(decoded.secure_url)
    }
}
