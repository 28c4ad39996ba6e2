//! CLI command implementations

pub mod campaigns;
pub mod config;
pub mod doctor;
pub mod generate;
pub mod post;

use anyhow::{Context, Result, bail};
use secrecy::SecretString;
use std::sync::Arc;

use ad_poster_adapters::bluesky::BlueskyPublisher;
use ad_poster_adapters::facebook::FacebookPublisher;
use ad_poster_adapters::gemini::{GeminiConfig, GeminiContentModel, GeminiImageModel};
use ad_poster_adapters::imagekit::ImageKitUploader;
use ad_poster_adapters::instagram::InstagramPublisher;
use ad_poster_adapters::stub::StubPublisher;
use ad_poster_adapters::twitter::{OAuth1Credentials, TwitterPublisher};
use ad_poster_domain::{CampaignAd, ImageHost, Platform, PlatformCatalog, usecases::PublisherSet};

use crate::config::AppConfig;

/// Read a required environment variable named by the config
pub(crate) fn load_env(env_name: &str, what: &str) -> Result<String> {
    match std::env::var(env_name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => bail!("Environment variable {env_name} is not set (required for {what})"),
    }
}

pub(crate) fn load_env_secret(env_name: &str, what: &str) -> Result<SecretString> {
    Ok(SecretString::new(load_env(env_name, what)?.into()))
}

/// Built-in platform settings merged with config-file overrides
pub(crate) fn platform_catalog(config: &AppConfig) -> PlatformCatalog {
    let mut catalog = PlatformCatalog::builtin();
    for (name, settings) in &config.platforms {
        match name.parse::<Platform>() {
            Ok(platform) => catalog.set(platform, settings.clone()),
            Err(_) => {
                tracing::warn!(platform = %name, "Ignoring settings override for unknown platform")
            }
        }
    }
    catalog
}

pub(crate) fn gemini_config(config: &AppConfig) -> GeminiConfig {
    GeminiConfig {
        text_model: config.gemini.text_model.clone(),
        image_model: config.gemini.image_model.clone(),
        temperature: config.gemini.temperature,
        max_output_tokens: config.gemini.max_output_tokens,
        timeout_secs: config.gemini.timeout_secs,
    }
}

pub(crate) fn build_content_model(config: &AppConfig) -> Result<GeminiContentModel> {
    let api_key = load_env_secret(&config.gemini.api_key_env, "Gemini")?;
    Ok(GeminiContentModel::new(api_key, gemini_config(config)))
}

pub(crate) fn build_image_model(config: &AppConfig) -> Result<GeminiImageModel> {
    let api_key = load_env_secret(&config.gemini.api_key_env, "Gemini")?;
    Ok(GeminiImageModel::new(api_key, gemini_config(config)))
}

/// Publishers for every enabled platform; stubs for all platforms in dry-run
pub(crate) fn build_publishers(config: &AppConfig, dry_run: bool) -> Result<PublisherSet> {
    let mut publishers = PublisherSet::new();

    if dry_run {
        for platform in Platform::ALL {
            publishers.insert(Arc::new(StubPublisher::new(platform)));
        }
        return Ok(publishers);
    }

    if config.facebook.enabled {
        let access_token = load_env_secret(&config.facebook.access_token_env, "Facebook")?;
        if config.facebook.page_id.is_empty() {
            bail!("facebook.page_id is not set");
        }
        publishers.insert(Arc::new(FacebookPublisher::new(
            config.facebook.page_id.clone(),
            access_token,
        )));
    }

    if config.instagram.enabled {
        let access_token = load_env_secret(&config.instagram.access_token_env, "Instagram")?;
        if config.instagram.account_id.is_empty() {
            bail!("instagram.account_id is not set");
        }
        let image_host: Arc<dyn ImageHost> = Arc::new(ImageKitUploader::new(load_env_secret(
            &config.imagekit.private_key_env,
            "ImageKit (Instagram image hosting)",
        )?));
        publishers.insert(Arc::new(InstagramPublisher::new(
            config.instagram.account_id.clone(),
            access_token,
            image_host,
        )));
    }

    if config.twitter.enabled {
        let credentials = OAuth1Credentials {
            consumer_key: load_env(&config.twitter.api_key_env, "Twitter")?,
            consumer_secret: load_env_secret(&config.twitter.api_key_secret_env, "Twitter")?,
            access_token: load_env(&config.twitter.access_token_env, "Twitter")?,
            access_token_secret: load_env_secret(
                &config.twitter.access_token_secret_env,
                "Twitter",
            )?,
        };
        let bearer_token = load_env_secret(&config.twitter.bearer_token_env, "Twitter")?;
        publishers.insert(Arc::new(TwitterPublisher::new(credentials, bearer_token)));
    }

    if config.bluesky.enabled {
        let handle = load_env(&config.bluesky.handle_env, "Bluesky")?;
        let password = load_env_secret(&config.bluesky.password_env, "Bluesky")?;
        publishers.insert(Arc::new(BlueskyPublisher::new(handle, password)));
    }

    Ok(publishers)
}

/// Banner preview of one generated ad
pub(crate) fn print_ad_preview(ad: &CampaignAd) {
    let line = "=".repeat(50);
    println!("\n{line}");
    println!("Platform: {}", ad.content.platform.to_string().to_uppercase());
    println!("{line}");
    println!("Headline: {}", ad.content.headline);
    println!("\nBody Text:");
    println!("{}", ad.content.body_text);
    println!("\nHashtags: {}", ad.content.hashtags.join(" "));
    println!("\nCall to Action: {}", ad.content.call_to_action);
    println!(
        "\nSuggested Image: {}",
        ad.content.suggested_image_description
    );
    match &ad.content.image_path {
        Some(path) => println!("\nImage: {}", path.display()),
        None => println!("\nImage: (none)"),
    }
    if let Some(status) = ad.posting_status {
        println!("\nPosting status: {status:?}");
        if let Some(details) = &ad.error_details {
            println!("Last error: {} - {}", details.error_type, details.message);
        }
    }
    println!("{line}\n");
}

/// Resolve the campaign id argument, defaulting to the newest saved campaign
pub(crate) async fn resolve_campaign_id(
    store: &ad_poster_adapters::store::FsCampaignStore,
    requested: Option<String>,
) -> Result<String> {
    use ad_poster_domain::CampaignStore;

    match requested {
        Some(id) => Ok(id),
        None => store
            .list()
            .await
            .context("Failed to list campaigns")?
            .into_iter()
            .next()
            .context("No campaigns found; run 'ad-poster generate' first"),
    }
}
