//! Bluesky (AT Protocol) publisher
//!
//! Authentication exchanges the handle and app password for a short-lived
//! session (`accessJwt` + `did`) that the adapter caches for its lifetime.
//! Post records carry a fixed `$type`-tagged envelope the API matches
//! exactly; the uploaded blob descriptor is embedded back verbatim.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::RwLock;
use unicode_segmentation::UnicodeSegmentation;

use ad_poster_domain::{AdPublisher, MediaRef, Platform, PostDraft, PublishError};

use crate::media::content_type_for_path;

const DEFAULT_BASE_URL: &str = "https://bsky.social";

/// Posts are cut well below Bluesky's real limit to leave headroom for the
/// appended store link.
const MAX_POST_GRAPHEMES: usize = 150;

pub struct BlueskyPublisher {
    client: Client,
    handle: String,
    password: SecretString,
    base_url: String,
    session: RwLock<Option<Session>>,
}

#[derive(Debug, Clone, Deserialize)]
struct Session {
    #[serde(rename = "accessJwt")]
    access_jwt: String,
    did: String,
}

#[derive(Deserialize)]
struct CreateRecordResponse {
    uri: String,
}

/// Truncate to the grapheme budget (with an ellipsis marking the cut), then
/// append the link. The truncation is grapheme-cluster aware, not byte or
/// code-point based, and always happens before the link goes on.
fn compose_post_text(message: &str, link: Option<&str>) -> String {
    let mut text = if message.graphemes(true).count() > MAX_POST_GRAPHEMES {
        let truncated: String = message.graphemes(true).take(MAX_POST_GRAPHEMES).collect();
        format!("{truncated}...")
    } else {
        message.to_string()
    };

    if let Some(link) = link {
        text = format!("{text} {link}");
    }

    text
}

impl BlueskyPublisher {
    pub fn new(handle: String, password: SecretString) -> Self {
        Self::with_base_url(handle, password, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(handle: String, password: SecretString, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            handle,
            password,
            base_url,
            session: RwLock::new(None),
        }
    }

    async fn session(&self) -> Result<Session, PublishError> {
        self.session.read().await.clone().ok_or_else(|| {
            PublishError::Authentication(
                "not logged in: call authenticate() first".to_string(),
            )
        })
    }
}

#[async_trait]
impl AdPublisher for BlueskyPublisher {
    fn platform(&self) -> Platform {
        Platform::Bluesky
    }

    /// Exchange handle + app password for a session token
    async fn authenticate(&self) -> Result<(), PublishError> {
        if self.handle.is_empty() || self.password.expose_secret().is_empty() {
            return Err(PublishError::Authentication(
                "missing Bluesky handle or password".to_string(),
            ));
        }

        let url = format!("{}/xrpc/com.atproto.server.createSession", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "identifier": self.handle,
                "password": self.password.expose_secret(),
            }))
            .send()
            .await
            .map_err(|e| PublishError::Authentication(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Authentication(format!(
                "createSession returned {status}: {body}"
            )));
        }

        let session: Session = response
            .json()
            .await
            .map_err(|e| PublishError::Authentication(e.to_string()))?;

        tracing::info!(handle = %self.handle, did = %session.did, "Bluesky session established");
        *self.session.write().await = Some(session);
        Ok(())
    }

    /// Upload raw image bytes, returning the blob descriptor verbatim
    async fn upload_media(&self, path: &Path) -> Result<MediaRef, PublishError> {
        let session = self.session().await?;

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            PublishError::MediaUpload(format!("failed to read {}: {e}", path.display()))
        })?;
        if bytes.is_empty() {
            return Err(PublishError::MediaUpload(format!(
                "{} is empty",
                path.display()
            )));
        }

        let url = format!("{}/xrpc/com.atproto.repo.uploadBlob", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", session.access_jwt))
            .header("Content-Type", content_type_for_path(path))
            .body(bytes)
            .timeout(Duration::from_secs(60))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PublishError::MediaUpload("blob upload timed out".to_string())
                } else {
                    PublishError::MediaUpload(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::MediaUpload(format!(
                "uploadBlob returned {status}: {body}"
            )));
        }

        let mut body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PublishError::MediaUpload(e.to_string()))?;
        let blob = body
            .get_mut("blob")
            .map(serde_json::Value::take)
            .ok_or_else(|| {
                PublishError::MediaUpload("uploadBlob response had no blob".to_string())
            })?;

        Ok(MediaRef::Blob(blob))
    }

    async fn publish(&self, draft: &PostDraft<'_>) -> Result<String, PublishError> {
        let session = self.session().await?;

        let blob = match draft.media {
            Some(MediaRef::Blob(blob)) => blob,
            Some(other) => {
                return Err(PublishError::Publish(format!(
                    "unsupported media reference for Bluesky: {other:?}"
                )));
            }
            None => {
                return Err(PublishError::Publish(
                    "an image is required for Bluesky posts".to_string(),
                ));
            }
        };

        let text = compose_post_text(draft.text, draft.link);
        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|e| PublishError::Publish(e.to_string()))?;

        let payload = serde_json::json!({
            "repo": session.did,
            "collection": "app.bsky.feed.post",
            "record": {
                "$type": "app.bsky.feed.post",
                "text": text,
                "createdAt": created_at,
                "embed": {
                    "$type": "app.bsky.embed.images",
                    "images": [
                        {
                            "alt": "Ad image",
                            "image": blob,
                        }
                    ],
                },
            },
        });

        let url = format!("{}/xrpc/com.atproto.repo.createRecord", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", session.access_jwt))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PublishError::Publish("createRecord timed out".to_string())
                } else {
                    PublishError::Publish(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Publish(format!(
                "createRecord returned {status}: {body}"
            )));
        }

        let record: CreateRecordResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Publish(e.to_string()))?;

        Ok(record.uri)
    }

    async fn reply(&self, _post_id: &str, _text: &str) -> Result<String, PublishError> {
        Err(PublishError::Publish(
            "replies are not supported on Bluesky; the link rides in the post text".to_string(),
        ))
    }
}
