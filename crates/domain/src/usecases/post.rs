//! Campaign posting use case
//!
//! Posts a generated campaign to each platform in its record, one at a time.
//! Failure isolation is per-platform: an adapter error is caught, recorded
//! into the campaign record, and the loop moves on. The record is rewritten
//! to the store after each platform's outcome is known.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::{Campaign, CampaignAd, ErrorDetails, Platform, PostingStatus};
use crate::ports::{AdPublisher, CampaignStore, Clock, PostDraft, PublishError, StoreError};

/// Closed set of configured publishers, at most one per platform
#[derive(Default)]
pub struct PublisherSet {
    publishers: BTreeMap<Platform, Arc<dyn AdPublisher>>,
}

impl PublisherSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a publisher under its own platform
    pub fn insert(&mut self, publisher: Arc<dyn AdPublisher>) {
        self.publishers.insert(publisher.platform(), publisher);
    }

    pub fn get(&self, platform: Platform) -> Option<&dyn AdPublisher> {
        self.publishers.get(&platform).map(|p| p.as_ref())
    }

    pub fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        self.publishers.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.publishers.is_empty()
    }
}

/// Tally of a posting run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl PostSummary {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Use case for posting a campaign to its platforms
pub struct CampaignPoster<'a> {
    publishers: &'a PublisherSet,
    store: &'a dyn CampaignStore,
    clock: &'a dyn Clock,
}

impl<'a> CampaignPoster<'a> {
    pub fn new(
        publishers: &'a PublisherSet,
        store: &'a dyn CampaignStore,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            publishers,
            store,
            clock,
        }
    }

    /// Post every ad in the campaign, one platform at a time, saving the
    /// record after each outcome.
    pub async fn post_all(&self, campaign: &mut Campaign) -> Result<PostSummary, StoreError> {
        let platforms: Vec<Platform> = campaign.ads.keys().copied().collect();
        let mut summary = PostSummary::default();

        for platform in platforms {
            if let Some(ad) = campaign.ads.get_mut(&platform) {
                self.attempt(platform, ad, &mut summary).await;
            }
            self.store.save(campaign).await?;
        }

        Ok(summary)
    }

    /// Post a single platform's ad, leaving the rest of the campaign untouched.
    pub async fn post_platform(
        &self,
        campaign: &mut Campaign,
        platform: Platform,
    ) -> Result<PostSummary, StoreError> {
        let mut summary = PostSummary::default();

        match campaign.ads.get_mut(&platform) {
            Some(ad) => self.attempt(platform, ad, &mut summary).await,
            None => {
                tracing::warn!(%platform, "Campaign has no ad for platform");
                summary.skipped += 1;
                return Ok(summary);
            }
        }

        self.store.save(campaign).await?;
        Ok(summary)
    }

    /// Run one platform's posting attempt and record the outcome into the ad
    async fn attempt(&self, platform: Platform, ad: &mut CampaignAd, summary: &mut PostSummary) {
        if ad.content.body_text.is_empty() {
            tracing::warn!(%platform, "Missing body text, skipping");
            ad.note("skipped: no body text");
            summary.skipped += 1;
            return;
        }

        let Some(publisher) = self.publishers.get(platform) else {
            tracing::warn!(%platform, "No publisher configured, skipping");
            ad.note("skipped: no publisher configured");
            summary.skipped += 1;
            return;
        };

        tracing::info!(%platform, "Posting ad");
        match post_one(publisher, ad).await {
            Ok(post_id) => {
                ad.posting_status = Some(PostingStatus::Success);
                ad.post_time = Some(self.clock.now());
                ad.error_details = None;
                summary.succeeded += 1;
                tracing::info!(%platform, %post_id, "Posted successfully");
            }
            Err(e) => {
                ad.posting_status = Some(PostingStatus::Failed);
                ad.error_details = Some(ErrorDetails {
                    error_type: e.kind().to_string(),
                    message: e.to_string(),
                });
                ad.note(format!("failed: {e}"));
                summary.failed += 1;
                tracing::error!(%platform, error = %e, "Posting failed");
            }
        }
    }
}

/// Full posting flow for one ad: authenticate, upload media when the file is
/// present (missing files degrade to text-only), publish, then attach the
/// call-to-action comment on platforms that take one.
async fn post_one(
    publisher: &dyn AdPublisher,
    ad: &mut CampaignAd,
) -> Result<String, PublishError> {
    publisher.authenticate().await?;
    ad.note("authenticated");

    let media = match &ad.content.image_path {
        Some(path) if path.exists() => {
            let media = publisher.upload_media(path).await?;
            ad.note(format!("uploaded media from {}", path.display()));
            Some(media)
        }
        Some(path) => {
            tracing::warn!(path = %path.display(), "Image file missing, posting text-only");
            ad.note(format!(
                "image {} missing, posting text-only",
                path.display()
            ));
            None
        }
        None => None,
    };

    let link = if ad.content.app_url.is_empty() {
        None
    } else {
        Some(ad.content.app_url.clone())
    };

    let draft = PostDraft {
        text: &ad.content.body_text,
        link: link.as_deref(),
        media: media.as_ref(),
    };
    let post_id = publisher.publish(&draft).await?;
    ad.note(format!("published post {post_id}"));

    if publisher.platform().supports_reply() {
        if let Some(url) = link.as_deref() {
            let cta = format!("Get the app on Google Play: {url}");
            let reply_id = publisher.reply(&post_id, &cta).await?;
            ad.note(format!("added call-to-action comment {reply_id}"));
        }
    }

    Ok(post_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AdContent;
    use crate::ports::MediaRef;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use time::OffsetDateTime;
    use time::macros::datetime;

    struct FixedClock(OffsetDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> OffsetDateTime {
            self.0
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        saves: Mutex<Vec<Campaign>>,
    }

    #[async_trait]
    impl CampaignStore for MemoryStore {
        async fn save(&self, campaign: &Campaign) -> Result<PathBuf, StoreError> {
            self.saves.lock().unwrap().push(campaign.clone());
            Ok(PathBuf::from(format!("{}.json", campaign.id)))
        }

        async fn load(&self, id: &str) -> Result<Campaign, StoreError> {
            Err(StoreError::NotFound(id.to_string()))
        }

        async fn list(&self) -> Result<Vec<String>, StoreError> {
            Ok(vec![])
        }

        async fn delete(&self, _id: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    struct FakePublisher {
        platform: Platform,
        fail: bool,
        published: Mutex<Vec<String>>,
        replies: Mutex<Vec<String>>,
    }

    impl FakePublisher {
        fn new(platform: Platform, fail: bool) -> Self {
            Self {
                platform,
                fail,
                published: Mutex::new(vec![]),
                replies: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl AdPublisher for FakePublisher {
        fn platform(&self) -> Platform {
            self.platform
        }

        async fn authenticate(&self) -> Result<(), PublishError> {
            Ok(())
        }

        async fn upload_media(&self, _path: &Path) -> Result<MediaRef, PublishError> {
            Ok(MediaRef::MediaId("media".to_string()))
        }

        async fn publish(&self, draft: &PostDraft<'_>) -> Result<String, PublishError> {
            if self.fail {
                return Err(PublishError::Publish("server said no".to_string()));
            }
            self.published.lock().unwrap().push(draft.text.to_string());
            Ok(format!("{}_post_1", self.platform))
        }

        async fn reply(&self, post_id: &str, text: &str) -> Result<String, PublishError> {
            self.replies
                .lock()
                .unwrap()
                .push(format!("{post_id}: {text}"));
            Ok(format!("{post_id}_reply"))
        }
    }

    fn ad(platform: Platform, body: &str) -> CampaignAd {
        CampaignAd::new(AdContent {
            platform,
            app_url: "https://play.google.com/store/apps/details?id=com.example".to_string(),
            headline: "Headline".to_string(),
            body_text: body.to_string(),
            hashtags: vec![],
            call_to_action: "Download".to_string(),
            suggested_image_description: String::new(),
            timestamp: datetime!(2025-01-01 00:00:00 UTC),
            image_path: None,
        })
    }

    #[tokio::test]
    async fn failure_on_one_platform_does_not_stop_the_rest() {
        let mut campaign = Campaign::new("ads_20250101_000000");
        campaign.ads.insert(Platform::Facebook, ad(Platform::Facebook, "fb body"));
        campaign.ads.insert(Platform::Twitter, ad(Platform::Twitter, "tw body"));

        let facebook = Arc::new(FakePublisher::new(Platform::Facebook, true));
        let twitter = Arc::new(FakePublisher::new(Platform::Twitter, false));
        let mut publishers = PublisherSet::new();
        publishers.insert(facebook.clone());
        publishers.insert(twitter.clone());

        let store = MemoryStore::default();
        let clock = FixedClock(datetime!(2025-01-01 12:00:00 UTC));
        let poster = CampaignPoster::new(&publishers, &store, &clock);

        let summary = poster.post_all(&mut campaign).await.unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);

        let fb = &campaign.ads[&Platform::Facebook];
        assert_eq!(fb.posting_status, Some(PostingStatus::Failed));
        let details = fb.error_details.as_ref().unwrap();
        assert_eq!(details.error_type, "PublishError");
        assert!(details.message.contains("server said no"));

        let tw = &campaign.ads[&Platform::Twitter];
        assert_eq!(tw.posting_status, Some(PostingStatus::Success));
        assert_eq!(tw.post_time, Some(datetime!(2025-01-01 12:00:00 UTC)));
        assert_eq!(twitter.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn record_is_saved_after_each_platform() {
        let mut campaign = Campaign::new("ads_20250101_000000");
        campaign.ads.insert(Platform::Facebook, ad(Platform::Facebook, "fb"));
        campaign.ads.insert(Platform::Twitter, ad(Platform::Twitter, "tw"));

        let mut publishers = PublisherSet::new();
        publishers.insert(Arc::new(FakePublisher::new(Platform::Facebook, false)));
        publishers.insert(Arc::new(FakePublisher::new(Platform::Twitter, false)));

        let store = MemoryStore::default();
        let clock = FixedClock(datetime!(2025-01-01 12:00:00 UTC));
        let poster = CampaignPoster::new(&publishers, &store, &clock);

        poster.post_all(&mut campaign).await.unwrap();

        assert_eq!(store.saves.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_body_text_is_skipped() {
        let mut campaign = Campaign::new("ads_20250101_000000");
        campaign.ads.insert(Platform::Twitter, ad(Platform::Twitter, ""));

        let publisher = Arc::new(FakePublisher::new(Platform::Twitter, false));
        let mut publishers = PublisherSet::new();
        publishers.insert(publisher.clone());

        let store = MemoryStore::default();
        let clock = FixedClock(datetime!(2025-01-01 12:00:00 UTC));
        let poster = CampaignPoster::new(&publishers, &store, &clock);

        let summary = poster.post_all(&mut campaign).await.unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.attempted(), 0);
        assert!(publisher.published.lock().unwrap().is_empty());
        assert_eq!(
            campaign.ads[&Platform::Twitter].posting_status,
            None
        );
    }

    #[tokio::test]
    async fn call_to_action_goes_out_as_a_reply() {
        let mut campaign = Campaign::new("ads_20250101_000000");
        campaign.ads.insert(Platform::Facebook, ad(Platform::Facebook, "fb"));

        let publisher = Arc::new(FakePublisher::new(Platform::Facebook, false));
        let mut publishers = PublisherSet::new();
        publishers.insert(publisher.clone());

        let store = MemoryStore::default();
        let clock = FixedClock(datetime!(2025-01-01 12:00:00 UTC));
        let poster = CampaignPoster::new(&publishers, &store, &clock);

        poster.post_all(&mut campaign).await.unwrap();

        let replies = publisher.replies.lock().unwrap();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("Get the app on Google Play:"));
    }
}
