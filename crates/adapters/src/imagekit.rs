//! ImageKit upload adapter
//!
//! Hosts generated images at a public URL, which Instagram's container API
//! requires. Authentication is HTTP Basic with the private key as username
//! and an empty password.

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use ad_poster_domain::{ImageHost, ImageHostError};

use crate::media::content_type_for_path;

const DEFAULT_BASE_URL: &str = "https://upload.imagekit.io";

pub struct ImageKitUploader {
    client: Client,
    private_key: SecretString,
    base_url: String,
}

impl ImageKitUploader {
    pub fn new(private_key: SecretString) -> Self {
        Self::with_base_url(private_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(private_key: SecretString, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            private_key,
            base_url,
        }
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

#[async_trait]
impl ImageHost for ImageKitUploader {
    async fn upload(
        &self,
        path: &Path,
        file_name: &str,
        tags: &[&str],
    ) -> Result<String, ImageHostError> {
        let bytes = tokio::fs::read(path).await?;

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type_for_path(path))
            .map_err(|e| ImageHostError::Api(e.to_string()))?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("fileName", file_name.to_string())
            .text("tags", tags.join(","));

        let url = format!("{}/api/v1/files/upload", self.base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(self.private_key.expose_secret(), Some(""))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ImageHostError::Api(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ImageHostError::Rejected(format!(
                "upload returned {status}: {body}"
            )));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| ImageHostError::Api(e.to_string()))?;

        tracing::info!(url = %uploaded.url, "Image hosted on ImageKit");
        Ok(uploaded.url)
    }
}
