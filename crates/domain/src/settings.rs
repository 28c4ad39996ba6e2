//! Per-platform publishing constraints and creative guidance
//!
//! The catalog is built once at startup and passed by reference into the
//! generators; nothing mutates it afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::Platform;

/// Publishing constraints for one platform, consulted by both the text and
/// image generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSettings {
    /// Maximum characters the platform accepts for the post body
    pub max_chars: usize,
    /// Maximum number of hashtags worth emitting
    pub hashtag_limit: usize,
    /// Preferred image dimensions (width, height) in pixels
    pub optimal_image_size: (u32, u32),
    /// Aspect ratio requested from the image model, e.g. "16:9"
    pub aspect_ratio: String,
    /// Hard ceiling on image file size, where the platform enforces one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_image_kb: Option<u64>,
    /// Tone guidance fed into the image prompt
    pub tone: String,
    /// Visual style guidance fed into the image prompt
    pub style: String,
}

/// Immutable map from platform to its settings
#[derive(Debug, Clone, Default)]
pub struct PlatformCatalog {
    settings: BTreeMap<Platform, PlatformSettings>,
}

impl PlatformCatalog {
    /// Catalog with the built-in defaults for every supported platform
    pub fn builtin() -> Self {
        let mut settings = BTreeMap::new();

        settings.insert(
            Platform::Facebook,
            PlatformSettings {
                max_chars: 2200,
                hashtag_limit: 30,
                optimal_image_size: (1200, 630),
                aspect_ratio: "16:9".to_string(),
                max_image_kb: None,
                tone: "friendly and engaging".to_string(),
                style: "clean, vibrant visuals with clear subjects, community-oriented feel"
                    .to_string(),
            },
        );

        settings.insert(
            Platform::Instagram,
            PlatformSettings {
                max_chars: 2200,
                hashtag_limit: 30,
                optimal_image_size: (1080, 1080),
                aspect_ratio: "1:1".to_string(),
                max_image_kb: None,
                tone: "visual and trendy".to_string(),
                style: "aesthetic, modern, bold colors, eye-catching composition".to_string(),
            },
        );

        settings.insert(
            Platform::Twitter,
            PlatformSettings {
                max_chars: 280,
                hashtag_limit: 10,
                optimal_image_size: (1200, 675),
                aspect_ratio: "16:9".to_string(),
                max_image_kb: None,
                tone: "concise and punchy".to_string(),
                style: "minimalistic, high contrast, quick-to-digest imagery".to_string(),
            },
        );

        settings.insert(
            Platform::Bluesky,
            PlatformSettings {
                max_chars: 200,
                hashtag_limit: 5,
                optimal_image_size: (1200, 675),
                aspect_ratio: "16:9".to_string(),
                // Documented API limit on uploaded blobs
                max_image_kb: Some(976),
                tone: "casual, authentic, and community-driven".to_string(),
                style: "clean, relatable visuals; organic feel; less polished, more 'real'"
                    .to_string(),
            },
        );

        Self { settings }
    }

    pub fn get(&self, platform: Platform) -> Option<&PlatformSettings> {
        self.settings.get(&platform)
    }

    /// Replace one platform's settings (configuration override)
    pub fn set(&mut self, platform: Platform, settings: PlatformSettings) {
        self.settings.insert(platform, settings);
    }

    pub fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        self.settings.keys().copied()
    }
}
