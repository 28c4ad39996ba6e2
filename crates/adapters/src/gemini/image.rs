//! Gemini (Imagen) image model adapter
//!
//! Requests one image at the platform's aspect ratio, then resizes and
//! re-encodes it to the platform's constraints before saving.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::format_description;

use ad_poster_domain::{ImageError, ImageModel, Platform, PlatformSettings};

use super::{DEFAULT_BASE_URL, GeminiConfig};
use crate::media::prepare_jpeg;

pub struct GeminiImageModel {
    client: Client,
    api_key: SecretString,
    config: GeminiConfig,
    base_url: String,
}

impl GeminiImageModel {
    pub fn new(api_key: SecretString, config: GeminiConfig) -> Self {
        Self::with_base_url(api_key, config, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: SecretString, config: GeminiConfig, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            config,
            base_url,
        }
    }

    async fn request_image(
        &self,
        prompt: &str,
        aspect_ratio: &str,
    ) -> Result<Vec<u8>, ImageError> {
        let request = PredictRequest {
            instances: vec![Instance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: aspect_ratio.to_string(),
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:predict?key={}",
            self.base_url,
            self.config.image_model,
            self.api_key.expose_secret()
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ImageError::Timeout
                } else {
                    ImageError::Api(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::Api(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let api_response: PredictResponse = response
            .json()
            .await
            .map_err(|e| ImageError::Api(e.to_string()))?;

        let encoded = api_response
            .predictions
            .into_iter()
            .next()
            .and_then(|p| p.bytes_base64_encoded)
            .ok_or(ImageError::NoImage)?;

        BASE64
            .decode(encoded)
            .map_err(|e| ImageError::Decode(e.to_string()))
    }
}

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<Instance>,
    parameters: PredictParameters,
}

#[derive(Serialize)]
struct Instance {
    prompt: String,
}

#[derive(Serialize)]
struct PredictParameters {
    #[serde(rename = "sampleCount")]
    sample_count: u32,
    #[serde(rename = "aspectRatio")]
    aspect_ratio: String,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: Option<String>,
}

/// Augment the creative description with platform tone/style guidance
fn refine_prompt(description: &str, settings: &PlatformSettings) -> String {
    format!(
        "{}. Style: {}. Tone: {}. Modern, high-quality ad creative, visually striking, \
         no text, no labels, no captions.",
        description, settings.style, settings.tone
    )
}

#[async_trait]
impl ImageModel for GeminiImageModel {
    async fn generate(
        &self,
        platform: Platform,
        settings: &PlatformSettings,
        description: &str,
        out_dir: &Path,
    ) -> Result<PathBuf, ImageError> {
        let prompt = refine_prompt(description, settings);
        tracing::info!(%platform, model = %self.config.image_model, "Generating ad image");

        let raw = self
            .request_image(&prompt, &settings.aspect_ratio)
            .await?;
        let encoded = prepare_jpeg(&raw, settings)?;

        tokio::fs::create_dir_all(out_dir).await?;

        let format = format_description!("[year][month][day]_[hour][minute][second]");
        let timestamp = OffsetDateTime::now_utc()
            .format(&format)
            .expect("timestamp format is valid");
        let filepath = out_dir.join(format!("ads_{platform}_{timestamp}.jpg"));

        tokio::fs::write(&filepath, encoded).await?;
        tracing::info!(path = %filepath.display(), "Saved ad image");

        Ok(filepath)
    }
}
