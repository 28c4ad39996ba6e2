//! Instagram Graph API publisher
//!
//! Instagram's API does not accept raw uploads for feed posts: publishing is
//! a two-step container pattern fed by a *public* image URL. `upload_media`
//! therefore pushes the local file through the configured [`ImageHost`]
//! first, and `publish` creates the media container from the returned URL and
//! then publishes it.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ad_poster_domain::{AdPublisher, ImageHost, MediaRef, Platform, PostDraft, PublishError};

const DEFAULT_BASE_URL: &str = "https://graph.facebook.com/v23.0";

/// Instagram business-account publisher using a long-lived access token
pub struct InstagramPublisher {
    client: Client,
    ig_user_id: String,
    access_token: SecretString,
    base_url: String,
    image_host: Arc<dyn ImageHost>,
    authenticated: AtomicBool,
}

impl InstagramPublisher {
    pub fn new(
        ig_user_id: String,
        access_token: SecretString,
        image_host: Arc<dyn ImageHost>,
    ) -> Self {
        Self::with_base_url(
            ig_user_id,
            access_token,
            image_host,
            DEFAULT_BASE_URL.to_string(),
        )
    }

    pub fn with_base_url(
        ig_user_id: String,
        access_token: SecretString,
        image_host: Arc<dyn ImageHost>,
        base_url: String,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            ig_user_id,
            access_token,
            base_url,
            image_host,
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

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        what: &str,
    ) -> Result<String, PublishError> {
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PublishError::Publish(format!("Instagram {what} request timed out"))
                } else {
                    PublishError::Publish(e.to_string())
                }
            })?;

        if response.status() == 401 {
            return Err(PublishError::Authentication(
                "Instagram rejected the access token".to_string(),
            ));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Publish(format!(
                "Instagram HTTP error: {status} - {body}"
            )));
        }

        let result: IdResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Publish(e.to_string()))?;

        Ok(result.id)
    }
}

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

#[async_trait]
impl AdPublisher for InstagramPublisher {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn authenticate(&self) -> Result<(), PublishError> {
        if self.ig_user_id.is_empty() || self.access_token.expose_secret().is_empty() {
            return Err(PublishError::Authentication(
                "missing Instagram account id or access token".to_string(),
            ));
        }
        self.authenticated.store(true, Ordering::Release);
        Ok(())
    }

    /// Host the local file at a public URL; that URL is the media reference
    async fn upload_media(&self, path: &Path) -> Result<MediaRef, PublishError> {
        self.ensure_authenticated()?;

        let url = self
            .image_host
            .upload(path, "uploaded_image.jpg", &["ads", "upload"])
            .await
            .map_err(|e| PublishError::MediaUpload(format!("image hosting failed: {e}")))?;

        tracing::info!(url = %url, "Image hosted for Instagram");
        Ok(MediaRef::PublicUrl(url))
    }

    async fn publish(&self, draft: &PostDraft<'_>) -> Result<String, PublishError> {
        self.ensure_authenticated()?;

        let image_url = match draft.media {
            Some(MediaRef::PublicUrl(url)) => url.as_str(),
            Some(other) => {
                return Err(PublishError::Publish(format!(
                    "unsupported media reference for Instagram: {other:?}"
                )));
            }
            None => {
                return Err(PublishError::Publish(
                    "Instagram requires a hosted image".to_string(),
                ));
            }
        };

        // Step 1: create the media container from the public URL
        let create_url = format!("{}/{}/media", self.base_url, self.ig_user_id);
        tracing::debug!(url = %create_url, "Creating Instagram media container");
        let creation_id = self
            .post_form(
                &create_url,
                &[
                    ("image_url", image_url),
                    ("caption", draft.text),
                    ("access_token", self.access_token.expose_secret()),
                ],
                "media creation",
            )
            .await?;

        // Step 2: publish the container
        let publish_url = format!("{}/{}/media_publish", self.base_url, self.ig_user_id);
        tracing::debug!(url = %publish_url, creation_id = %creation_id, "Publishing Instagram media");
        let media_id = self
            .post_form(
                &publish_url,
                &[
                    ("creation_id", creation_id.as_str()),
                    ("access_token", self.access_token.expose_secret()),
                ],
                "media publish",
            )
            .await?;

        Ok(media_id)
    }

    async fn reply(&self, post_id: &str, text: &str) -> Result<String, PublishError> {
        self.ensure_authenticated()?;

        let url = format!("{}/{}/comments", self.base_url, post_id);
        self.post_form(
            &url,
            &[
                ("message", text),
                ("access_token", self.access_token.expose_secret()),
            ],
            "comment",
        )
        .await
    }
}
