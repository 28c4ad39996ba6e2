//! Facebook Graph API publisher
//!
//! Posting with an image is two sequential calls: an unpublished photo upload
//! to `/photos`, then a `/feed` post referencing the photo id through
//! `attached_media`. Text-only posts go straight to `/feed`.

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ad_poster_domain::{AdPublisher, MediaRef, Platform, PostDraft, PublishError};

use crate::media::content_type_for_path;

const DEFAULT_BASE_URL: &str = "https://graph.facebook.com/v23.0";

/// Facebook page publisher using a long-lived page access token
pub struct FacebookPublisher {
    client: Client,
    page_id: String,
    access_token: SecretString,
    base_url: String,
    authenticated: AtomicBool,
}

impl FacebookPublisher {
    pub fn new(page_id: String, access_token: SecretString) -> Self {
        Self::with_base_url(page_id, access_token, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(page_id: String, access_token: SecretString, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            page_id,
            access_token,
            base_url,
            authenticated: AtomicBool::new(false),
        }
    }

    fn ensure_authenticated(&self) -> Result<(), PublishError> {
        if !self.authenticated.load(Ordering::Acquire) {
            return Err(PublishError::Authentication(
                "not authenticated: call authenticate() first".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct FeedRequest {
    access_token: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    attached_media: Option<Vec<AttachedMedia>>,
}

#[derive(Serialize)]
struct AttachedMedia {
    media_fbid: String,
}

#[derive(Serialize)]
struct CommentRequest {
    access_token: String,
    message: String,
}

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

#[async_trait]
impl AdPublisher for FacebookPublisher {
    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    async fn authenticate(&self) -> Result<(), PublishError> {
        if self.page_id.is_empty() || self.access_token.expose_secret().is_empty() {
            return Err(PublishError::Authentication(
                "missing Facebook page id or access token".to_string(),
            ));
        }
        self.authenticated.store(true, Ordering::Release);
        Ok(())
    }

    async fn upload_media(&self, path: &Path) -> Result<MediaRef, PublishError> {
        self.ensure_authenticated()?;

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            PublishError::MediaUpload(format!("failed to read {}: {e}", path.display()))
        })?;
        if bytes.is_empty() {
            return Err(PublishError::MediaUpload(format!(
                "{} is empty",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.jpg".to_string());
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type_for_path(path))
            .map_err(|e| PublishError::MediaUpload(e.to_string()))?;
        let form = multipart::Form::new()
            .part("source", part)
            .text(
                "access_token",
                self.access_token.expose_secret().to_string(),
            )
            .text("published", "false");

        let url = format!("{}/{}/photos", self.base_url, self.page_id);
        tracing::debug!(url = %url, "Uploading photo to Facebook");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(Duration::from_secs(60))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PublishError::MediaUpload("Facebook photo upload timed out".to_string())
                } else {
                    PublishError::MediaUpload(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::MediaUpload(format!(
                "Facebook photo upload returned {status}: {body}"
            )));
        }

        let uploaded: IdResponse = response
            .json()
            .await
            .map_err(|e| PublishError::MediaUpload(e.to_string()))?;

        Ok(MediaRef::PhotoId(uploaded.id))
    }

    async fn publish(&self, draft: &PostDraft<'_>) -> Result<String, PublishError> {
        self.ensure_authenticated()?;

        let attached_media = match draft.media {
            Some(MediaRef::PhotoId(id)) => Some(vec![AttachedMedia {
                media_fbid: id.clone(),
            }]),
            Some(other) => {
                return Err(PublishError::Publish(format!(
                    "unsupported media reference for Facebook: {other:?}"
                )));
            }
            None => None,
        };

        let request = FeedRequest {
            access_token: self.access_token.expose_secret().to_string(),
            message: draft.text.to_string(),
            attached_media,
        };

        let url = format!("{}/{}/feed", self.base_url, self.page_id);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PublishError::Publish("Facebook request timed out".to_string())
                } else {
                    PublishError::Publish(e.to_string())
                }
            })?;

        if response.status() == 401 {
            return Err(PublishError::Authentication(
                "Facebook rejected the access token".to_string(),
            ));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Publish(format!(
                "Facebook HTTP error: {status} - {body}"
            )));
        }

        let posted: IdResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Publish(e.to_string()))?;

        Ok(posted.id)
    }

    async fn reply(&self, post_id: &str, text: &str) -> Result<String, PublishError> {
        self.ensure_authenticated()?;

        let request = CommentRequest {
            access_token: self.access_token.expose_secret().to_string(),
            message: text.to_string(),
        };

        let url = format!("{}/{}/comments", self.base_url, post_id);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PublishError::Publish("Facebook comment request timed out".to_string())
                } else {
                    PublishError::Publish(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Publish(format!(
                "Facebook comment HTTP error: {status} - {body}"
            )));
        }

        let comment: IdResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Publish(e.to_string()))?;

        Ok(comment.id)
    }
}
