//! Recording stubs for tests and dry-run mode

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use time::OffsetDateTime;
use time::macros::format_description;

use ad_poster_domain::{
    AdContent, AdPublisher, AppInfo, ContentError, ContentModel, ImageError, ImageModel, MediaRef,
    Platform, PlatformSettings, PostDraft, PublishError,
};

/// Publisher that records instead of posting
pub struct StubPublisher {
    platform: Platform,
    published: Mutex<Vec<String>>,
    replies: Mutex<Vec<String>>,
}

impl StubPublisher {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            published: Mutex::new(vec![]),
            replies: Mutex::new(vec![]),
        }
    }

    /// Texts of all posts that were published
    pub fn published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }

    /// Texts of all replies that were attached
    pub fn replies(&self) -> Vec<String> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl AdPublisher for StubPublisher {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn authenticate(&self) -> Result<(), PublishError> {
        Ok(())
    }

    async fn upload_media(&self, path: &Path) -> Result<MediaRef, PublishError> {
        if !path.exists() {
            return Err(PublishError::MediaUpload(format!(
                "{} does not exist",
                path.display()
            )));
        }
        Ok(MediaRef::MediaId(format!("stub_media_{}", self.platform)))
    }

    async fn publish(&self, draft: &PostDraft<'_>) -> Result<String, PublishError> {
        let mut published = self.published.lock().unwrap();
        published.push(draft.text.to_string());
        let id = format!("stub_{}_{}", self.platform, published.len());
        tracing::info!(platform = %self.platform, %id, "Dry-run: post recorded, not sent");
        Ok(id)
    }

    async fn reply(&self, post_id: &str, text: &str) -> Result<String, PublishError> {
        self.replies.lock().unwrap().push(text.to_string());
        Ok(format!("{post_id}_reply"))
    }
}

/// Content model producing deterministic copy from the app metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct StubContentModel;

#[async_trait]
impl ContentModel for StubContentModel {
    async fn generate_ad(
        &self,
        app: &AppInfo,
        platform: Platform,
        settings: &PlatformSettings,
    ) -> Result<AdContent, ContentError> {
        let mut body = format!("{}: {}", app.name, app.description);
        if body.len() > settings.max_chars {
            body.truncate(settings.max_chars);
        }

        Ok(AdContent {
            platform,
            app_url: app.app_url.clone(),
            headline: format!("Discover {}", app.name),
            body_text: body,
            hashtags: vec![format!("#{}", app.category.replace(' ', ""))],
            call_to_action: "Download now".to_string(),
            suggested_image_description: format!("A scene evoking {}", app.name),
            timestamp: OffsetDateTime::now_utc(),
            image_path: None,
        })
    }
}

/// Image model that writes a placeholder file instead of calling an API
#[derive(Debug, Clone, Copy, Default)]
pub struct StubImageModel;

#[async_trait]
impl ImageModel for StubImageModel {
    async fn generate(
        &self,
        platform: Platform,
        settings: &PlatformSettings,
        _description: &str,
        out_dir: &Path,
    ) -> Result<PathBuf, ImageError> {
        tokio::fs::create_dir_all(out_dir).await?;

        let (width, height) = settings.optimal_image_size;
        let placeholder =
            image::DynamicImage::ImageRgb8(image::ImageBuffer::from_pixel(
                width,
                height,
                image::Rgb([200u8, 200, 200]),
            ));
        let encoded = crate::media::compress_under_limit(
            &placeholder,
            settings.max_image_kb.unwrap_or(u64::MAX / 1024),
        )?;

        let format = format_description!("[year][month][day]_[hour][minute][second]");
        let timestamp = OffsetDateTime::now_utc()
            .format(&format)
            .expect("timestamp format is valid");
        let filepath = out_dir.join(format!("ads_{platform}_{timestamp}.jpg"));
        tokio::fs::write(&filepath, encoded).await?;

        Ok(filepath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad_poster_domain::PlatformCatalog;

    fn sample_app() -> AppInfo {
        AppInfo {
            name: "Terra Nova".to_string(),
            description: "A space adventure".to_string(),
            category: "Text-based games".to_string(),
            key_features: vec![],
            guide: String::new(),
            target_audience: "Gamers".to_string(),
            app_url: "https://play.google.com/store/apps/details?id=com.example".to_string(),
            icon_path: None,
            screenshots: None,
        }
    }

    #[tokio::test]
    async fn stub_publisher_records_posts_and_replies() {
        let publisher = StubPublisher::new(Platform::Facebook);
        publisher.authenticate().await.unwrap();

        let draft = PostDraft {
            text: "hello",
            link: None,
            media: None,
        };
        let id = publisher.publish(&draft).await.unwrap();
        publisher.reply(&id, "cta").await.unwrap();

        assert_eq!(publisher.published(), vec!["hello"]);
        assert_eq!(publisher.replies(), vec!["cta"]);
    }

    #[tokio::test]
    async fn stub_content_model_respects_the_char_limit() {
        let catalog = PlatformCatalog::builtin();
        let content = StubContentModel
            .generate_ad(
                &sample_app(),
                Platform::Twitter,
                catalog.get(Platform::Twitter).unwrap(),
            )
            .await
            .unwrap();

        assert!(content.body_text.len() <= 280);
        assert_eq!(content.hashtags, vec!["#Text-basedgames"]);
    }

    #[tokio::test]
    async fn stub_image_model_writes_a_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = PlatformCatalog::builtin();

        let path = StubImageModel
            .generate(
                Platform::Bluesky,
                catalog.get(Platform::Bluesky).unwrap(),
                "anything",
                dir.path(),
            )
            .await
            .unwrap();

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() <= 976 * 1024);
    }
}
