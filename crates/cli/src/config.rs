//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ad_poster_domain::{AppInfo, PlatformSettings};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub gemini: GeminiSection,

    #[serde(default)]
    pub facebook: FacebookConfig,

    #[serde(default)]
    pub instagram: InstagramConfig,

    #[serde(default)]
    pub twitter: TwitterConfig,

    #[serde(default)]
    pub bluesky: BlueskyConfig,

    #[serde(default)]
    pub imagekit: ImageKitConfig,

    /// Per-platform overrides of the built-in publishing settings
    #[serde(default)]
    pub platforms: BTreeMap<String, PlatformSettings>,

    /// App templates available to `generate --app <id>`
    #[serde(default)]
    pub apps: BTreeMap<String, AppInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSection {
    #[serde(default = "default_gemini_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_text_model")]
    pub text_model: String,

    #[serde(default = "default_image_model")]
    pub image_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacebookConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub page_id: String,

    #[serde(default = "default_facebook_token_env")]
    pub access_token_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub account_id: String,

    #[serde(default = "default_instagram_token_env")]
    pub access_token_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_twitter_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_twitter_api_key_secret_env")]
    pub api_key_secret_env: String,

    #[serde(default = "default_twitter_access_token_env")]
    pub access_token_env: String,

    #[serde(default = "default_twitter_access_token_secret_env")]
    pub access_token_secret_env: String,

    #[serde(default = "default_twitter_bearer_token_env")]
    pub bearer_token_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueskyConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_bluesky_handle_env")]
    pub handle_env: String,

    #[serde(default = "default_bluesky_password_env")]
    pub password_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageKitConfig {
    #[serde(default = "default_imagekit_key_env")]
    pub private_key_env: String,
}

// Default value functions
fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_gemini_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "imagen-4.0-generate-001".to_string()
}

fn default_temperature() -> f64 {
    1.0
}

fn default_max_output_tokens() -> u32 {
    2048
}

fn default_timeout() -> u64 {
    30
}

fn default_facebook_token_env() -> String {
    "FB_ACCESS_TOKEN".to_string()
}

fn default_instagram_token_env() -> String {
    "INSTAGRAM_ACCESS_TOKEN".to_string()
}

fn default_twitter_api_key_env() -> String {
    "TWITTER_API_KEY".to_string()
}

fn default_twitter_api_key_secret_env() -> String {
    "TWITTER_API_KEY_SECRET".to_string()
}

fn default_twitter_access_token_env() -> String {
    "TWITTER_ACCESS_TOKEN".to_string()
}

fn default_twitter_access_token_secret_env() -> String {
    "TWITTER_ACCESS_TOKEN_SECRET".to_string()
}

fn default_twitter_bearer_token_env() -> String {
    "TWITTER_BEARER_TOKEN".to_string()
}

fn default_bluesky_handle_env() -> String {
    "BSKY_HANDLE".to_string()
}

fn default_bluesky_password_env() -> String {
    "BSKY_PASSWORD".to_string()
}

fn default_imagekit_key_env() -> String {
    "IMAGEKIT_PRIVATE_KEY".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for GeminiSection {
    fn default() -> Self {
        Self {
            api_key_env: default_gemini_api_key_env(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for FacebookConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            page_id: String::new(),
            access_token_env: default_facebook_token_env(),
        }
    }
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            account_id: String::new(),
            access_token_env: default_instagram_token_env(),
        }
    }
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key_env: default_twitter_api_key_env(),
            api_key_secret_env: default_twitter_api_key_secret_env(),
            access_token_env: default_twitter_access_token_env(),
            access_token_secret_env: default_twitter_access_token_secret_env(),
            bearer_token_env: default_twitter_bearer_token_env(),
        }
    }
}

impl Default for BlueskyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            handle_env: default_bluesky_handle_env(),
            password_env: default_bluesky_password_env(),
        }
    }
}

impl Default for ImageKitConfig {
    fn default() -> Self {
        Self {
            private_key_env: default_imagekit_key_env(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("AD_POSTER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# ad-poster configuration

[general]
output_dir = "./output"
log_level = "info"

[gemini]
api_key_env = "GOOGLE_API_KEY"
text_model = "gemini-2.5-flash"
image_model = "imagen-4.0-generate-001"
temperature = 1.0
max_output_tokens = 2048
timeout_secs = 30

[facebook]
enabled = false
page_id = ""
access_token_env = "FB_ACCESS_TOKEN"

[instagram]
enabled = false
account_id = ""
access_token_env = "INSTAGRAM_ACCESS_TOKEN"

[twitter]
enabled = false
api_key_env = "TWITTER_API_KEY"
api_key_secret_env = "TWITTER_API_KEY_SECRET"
access_token_env = "TWITTER_ACCESS_TOKEN"
access_token_secret_env = "TWITTER_ACCESS_TOKEN_SECRET"
bearer_token_env = "TWITTER_BEARER_TOKEN"

[bluesky]
enabled = false
handle_env = "BSKY_HANDLE"
password_env = "BSKY_PASSWORD"

[imagekit]
private_key_env = "IMAGEKIT_PRIVATE_KEY"

# Override built-in platform settings if needed:
# [platforms.twitter]
# max_chars = 280
# hashtag_limit = 10
# optimal_image_size = [1200, 675]
# aspect_ratio = "16:9"
# tone = "concise and punchy"
# style = "minimalistic, high contrast, quick-to-digest imagery"

[apps.example_app]
name = "Example App"
description = "One-line pitch for your app"
category = "Productivity"
key_features = ["Ad free", "Offline mode"]
guide = ""
target_audience = "People aged 18-45"
app_url = "https://play.google.com/store/apps/details?id=com.example.app"
"#
        .to_string()
    }
}
