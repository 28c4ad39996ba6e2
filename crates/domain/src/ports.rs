//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{AdContent, AppInfo, Campaign, Platform};
use crate::settings::PlatformSettings;

/// Error type for platform publishing operations
///
/// Every variant is terminal for the operation that raised it; adapters never
/// retry. The orchestrator catches these at the per-platform boundary and
/// records them into the campaign file.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Missing or rejected credentials. Fatal for the adapter instance.
    #[error("authentication failed: {0}")]
    Authentication(String),
    /// Media upload failed: missing file, timeout, connection, or non-2xx
    #[error("media upload failed: {0}")]
    MediaUpload(String),
    /// Post or reply creation failed
    #[error("publish failed: {0}")]
    Publish(String),
}

impl PublishError {
    /// Stable name recorded in the campaign file next to the message
    pub fn kind(&self) -> &'static str {
        match self {
            PublishError::Authentication(_) => "AuthenticationError",
            PublishError::MediaUpload(_) => "MediaUploadError",
            PublishError::Publish(_) => "PublishError",
        }
    }
}

/// Platform-specific opaque media reference returned by `upload_media`
///
/// The shape is deliberately not unified: each platform's publish step needs
/// its own kind of handle.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaRef {
    /// Facebook unpublished photo id, referenced via `attached_media`
    PhotoId(String),
    /// Twitter v1.1 media id
    MediaId(String),
    /// Publicly hosted image URL (Instagram's container API accepts no raw upload)
    PublicUrl(String),
    /// Bluesky blob descriptor, embedded verbatim in the post record
    Blob(serde_json::Value),
}

/// Draft of a primary post
#[derive(Debug, Clone, Copy)]
pub struct PostDraft<'a> {
    pub text: &'a str,
    /// Call-to-action link. Most platforms receive it as a follow-up
    /// comment/reply so the primary post stays clean; Bluesky appends it to
    /// the post text after truncation.
    pub link: Option<&'a str>,
    pub media: Option<&'a MediaRef>,
}

/// Port for publishing to one social platform
///
/// Contract: `authenticate` must succeed before any media- or
/// record-producing call; adapters fail such calls with
/// [`PublishError::Authentication`] without touching the network.
#[async_trait]
pub trait AdPublisher: Send + Sync {
    fn platform(&self) -> Platform;

    /// Establish a session or confirm static credentials are present
    async fn authenticate(&self) -> Result<(), PublishError>;

    /// Upload a local file to the platform's binary-upload endpoint
    async fn upload_media(&self, path: &Path) -> Result<MediaRef, PublishError>;

    /// Create the primary post; returns the platform-assigned post id
    async fn publish(&self, draft: &PostDraft<'_>) -> Result<String, PublishError>;

    /// Attach a text-only comment/reply to an existing post
    async fn reply(&self, post_id: &str, text: &str) -> Result<String, PublishError>;
}

/// Error type for ad-copy generation
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("model API error: {0}")]
    Api(String),
    #[error("model request timed out")]
    Timeout,
    /// Safety filters blocked the response, or it carried no candidates
    #[error("response blocked: {0}")]
    Blocked(String),
    /// Model output was not the expected five-field JSON object
    #[error("invalid response format: {0}")]
    InvalidFormat(String),
    #[error("configuration error: {0}")]
    Config(String),
}

/// Port for generating ad copy from app metadata
#[async_trait]
pub trait ContentModel: Send + Sync {
    /// Generate an ad creative for one platform. Errors are non-fatal for the
    /// campaign; the orchestrator logs and skips the platform.
    async fn generate_ad(
        &self,
        app: &AppInfo,
        platform: Platform,
        settings: &PlatformSettings,
    ) -> Result<AdContent, ContentError>;
}

/// Error type for promotional image generation
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image API error: {0}")]
    Api(String),
    #[error("image request timed out")]
    Timeout,
    #[error("no image was generated")]
    NoImage,
    /// Re-encoding never fit under the platform's byte ceiling
    #[error("image could not be compressed below {limit_kb} KB")]
    TooLarge { limit_kb: u64 },
    #[error("image decode error: {0}")]
    Decode(String),
    #[error("image encode error: {0}")]
    Encode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Port for generating a platform-optimized promotional image
#[async_trait]
pub trait ImageModel: Send + Sync {
    /// Generate an image for the description, resized and (where the platform
    /// demands it) compressed to fit. Returns the saved file path. Never
    /// returns a path to a file exceeding the platform's byte ceiling.
    async fn generate(
        &self,
        platform: Platform,
        settings: &PlatformSettings,
        description: &str,
        out_dir: &Path,
    ) -> Result<PathBuf, ImageError>;
}

/// Error type for public image hosting
#[derive(Debug, Error)]
pub enum ImageHostError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("host API error: {0}")]
    Api(String),
    #[error("upload rejected: {0}")]
    Rejected(String),
}

/// Port for hosting an image at a public URL
///
/// Instagram's container API only accepts a public URL, so its adapter
/// uploads through this port first.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(
        &self,
        path: &Path,
        file_name: &str,
        tags: &[&str],
    ) -> Result<String, ImageHostError>;
}

/// Error type for campaign persistence
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("campaign not found: {0}")]
    NotFound(String),
}

/// Port for persisting campaign records
///
/// One JSON document per campaign, rewritten wholesale on save. Concurrent
/// writers are not guarded against; callers serialize access.
#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// Write the campaign record, returning the path it was saved to
    async fn save(&self, campaign: &Campaign) -> Result<PathBuf, StoreError>;

    async fn load(&self, id: &str) -> Result<Campaign, StoreError>;

    /// Campaign ids, newest first
    async fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Remove the campaign record and its generated image files
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
