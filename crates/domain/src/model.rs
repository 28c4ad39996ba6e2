//! Domain models and value objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use time::OffsetDateTime;
use time::macros::format_description;

/// A social platform with a publishing adapter
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Twitter,
    Bluesky,
}

impl Platform {
    /// All supported platforms, in default posting order
    pub const ALL: [Platform; 4] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::Twitter,
        Platform::Bluesky,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Twitter => "twitter",
            Platform::Bluesky => "bluesky",
        }
    }

    /// Whether the platform refuses a post without an image
    pub fn requires_media(&self) -> bool {
        matches!(self, Platform::Instagram | Platform::Bluesky)
    }

    /// Whether the call-to-action link is delivered as a follow-up
    /// comment/reply. Bluesky carries the link inside the post text instead.
    pub fn supports_reply(&self) -> bool {
        !matches!(self, Platform::Bluesky)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for platform names outside the supported set
#[derive(Debug, Clone, thiserror::Error)]
#[error("unsupported platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "facebook" => Ok(Platform::Facebook),
            "instagram" => Ok(Platform::Instagram),
            "twitter" => Ok(Platform::Twitter),
            "bluesky" => Ok(Platform::Bluesky),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}

/// Static description of the app being advertised
///
/// Loaded once at startup from configuration and treated as a constant for
/// the run; the pipeline never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub description: String,
    pub category: String,
    pub key_features: Vec<String>,
    /// Long-form gameplay/usage guide embedded in the generation prompt
    #[serde(default)]
    pub guide: String,
    pub target_audience: String,
    /// Canonical store URL, appended to posts as the call to action
    pub app_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshots: Option<Vec<String>>,
}

/// Generated ad creative for one (campaign, platform) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdContent {
    pub platform: Platform,
    pub app_url: String,
    pub headline: String,
    pub body_text: String,
    pub hashtags: Vec<String>,
    pub call_to_action: String,
    /// Prompt handed to the image model. Must describe a purely visual
    /// concept; image models render embedded text poorly.
    pub suggested_image_description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
}

/// Outcome of a posting attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingStatus {
    Success,
    Failed,
}

/// Error variant name and message recorded verbatim for dashboard display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub error_type: String,
    pub message: String,
}

/// One platform's entry in a campaign record: the generated creative plus
/// post-tracking fields filled in when posting is attempted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignAd {
    #[serde(flatten)]
    pub content: AdContent,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub post_time: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posting_status: Option<PostingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<ErrorDetails>,
    /// Human-readable progress trace, appended step by step while posting
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub progress: Vec<String>,
}

impl CampaignAd {
    pub fn new(content: AdContent) -> Self {
        Self {
            content,
            post_time: None,
            posting_status: None,
            error_details: None,
            progress: vec![],
        }
    }

    /// Append a line to the progress trace
    pub fn note(&mut self, message: impl Into<String>) {
        self.progress.push(message.into());
    }
}

/// One generation run: ad creatives for a set of platforms, persisted as a
/// single JSON document named by creation timestamp. This is the unit of
/// durability; there is no database.
///
/// Invariant: a platform key present in `ads` means generation succeeded for
/// that platform. Skipped or failed platforms are absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Campaign {
    /// Record name, `ads_YYYYMMDD_HHMMSS`
    pub id: String,
    pub ads: BTreeMap<Platform, CampaignAd>,
}

impl Campaign {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ads: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ads.is_empty()
    }

    /// Paths of all generated images referenced by this campaign
    pub fn image_paths(&self) -> Vec<&Path> {
        self.ads
            .values()
            .filter_map(|ad| ad.content.image_path.as_deref())
            .collect()
    }
}

/// Campaign record name for a creation instant
pub fn campaign_id(created_at: OffsetDateTime) -> String {
    let format = format_description!("[year][month][day]_[hour][minute][second]");
    format!(
        "ads_{}",
        created_at
            .format(&format)
            .expect("timestamp format is valid")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn platform_parses_lowercase_names_only() {
        assert_eq!("facebook".parse::<Platform>().unwrap(), Platform::Facebook);
        assert_eq!("bluesky".parse::<Platform>().unwrap(), Platform::Bluesky);
        assert!("Bluesky".parse::<Platform>().is_err());
        assert!("bogus_platform".parse::<Platform>().is_err());
    }

    #[test]
    fn campaign_id_uses_timestamp_naming() {
        let id = campaign_id(datetime!(2025-09-09 16:06:47 UTC));
        assert_eq!(id, "ads_20250909_160647");
    }

    #[test]
    fn campaign_ad_serializes_flat() {
        let ad = CampaignAd::new(AdContent {
            platform: Platform::Twitter,
            app_url: "https://play.google.com/store/apps/details?id=com.example".to_string(),
            headline: "Headline".to_string(),
            body_text: "Body 🚀".to_string(),
            hashtags: vec!["#indiegame".to_string(), "#安卓".to_string()],
            call_to_action: "Download now".to_string(),
            suggested_image_description: "A spaceship over a nebula".to_string(),
            timestamp: datetime!(2025-09-09 16:06:47 UTC),
            image_path: None,
        });

        let json = serde_json::to_value(&ad).unwrap();
        // AdContent fields are flattened; tracking fields absent until posting
        assert_eq!(json["platform"], "twitter");
        assert_eq!(json["headline"], "Headline");
        assert_eq!(json["timestamp"], "2025-09-09T16:06:47Z");
        assert!(json.get("posting_status").is_none());
        assert!(json.get("progress").is_none());

        let back: CampaignAd = serde_json::from_value(json).unwrap();
        assert_eq!(back, ad);
    }

    #[test]
    fn campaign_ad_roundtrips_tracking_fields() {
        let mut ad = CampaignAd::new(AdContent {
            platform: Platform::Facebook,
            app_url: String::new(),
            headline: String::new(),
            body_text: "text".to_string(),
            hashtags: vec![],
            call_to_action: String::new(),
            suggested_image_description: String::new(),
            timestamp: datetime!(2025-01-02 03:04:05 UTC),
            image_path: Some(PathBuf::from("output/ads_facebook_20250102_030405.jpg")),
        });
        ad.post_time = Some(datetime!(2025-01-02 03:10:00 UTC));
        ad.posting_status = Some(PostingStatus::Failed);
        ad.error_details = Some(ErrorDetails {
            error_type: "PublishError".to_string(),
            message: "Facebook HTTP error: 400".to_string(),
        });
        ad.note("authenticated");

        let json = serde_json::to_string(&ad).unwrap();
        let back: CampaignAd = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ad);
        assert_eq!(back.posting_status, Some(PostingStatus::Failed));
    }
}
