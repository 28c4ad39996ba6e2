//! Generate command - create ad content and images for an app

use anyhow::{Context, Result};
use std::path::PathBuf;

use ad_poster_adapters::store::FsCampaignStore;
use ad_poster_adapters::stub::{StubContentModel, StubImageModel};
use ad_poster_domain::{
    CampaignStore, ContentModel, ImageModel, Platform, SystemClock,
    usecases::{CampaignGenerator, CampaignPoster, GenerateOptions},
};

use crate::args::GenerateArgs;
use crate::commands::{
    build_content_model, build_image_model, build_publishers, platform_catalog, print_ad_preview,
};
use crate::config::AppConfig;

pub async fn execute(args: GenerateArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let app = config.apps.get(&args.app).with_context(|| {
        let known: Vec<&str> = config.apps.keys().map(String::as_str).collect();
        format!(
            "Unknown app '{}'. Configured apps: {}",
            args.app,
            if known.is_empty() {
                "(none)".to_string()
            } else {
                known.join(", ")
            }
        )
    })?;

    let platforms: Vec<String> = args.platforms.unwrap_or_else(|| {
        Platform::ALL
            .iter()
            .map(|p| p.as_str().to_string())
            .collect()
    });

    let catalog = platform_catalog(&config);
    let store = FsCampaignStore::new(&config.general.output_dir);
    let clock = SystemClock;
    let options = GenerateOptions {
        generate_images: !args.skip_images,
    };

    tracing::info!(
        app = %app.name,
        platforms = ?platforms,
        dry_run = args.dry_run,
        generate_images = options.generate_images,
        "Starting generation"
    );

    let content: Box<dyn ContentModel> = if args.dry_run {
        Box::new(StubContentModel)
    } else {
        Box::new(build_content_model(&config)?)
    };
    let image: Box<dyn ImageModel> = if args.dry_run {
        Box::new(StubImageModel)
    } else {
        Box::new(build_image_model(&config)?)
    };

    let generator = CampaignGenerator::new(
        &*content,
        &*image,
        &catalog,
        &clock,
        &config.general.output_dir,
    );
    let mut campaign = generator.generate(app, &platforms, &options).await;

    if campaign.is_empty() {
        println!("No ads were generated; see the log for per-platform reasons.");
        return Ok(());
    }

    for ad in campaign.ads.values() {
        print_ad_preview(ad);
    }

    let saved = store
        .save(&campaign)
        .await
        .context("Failed to save campaign")?;
    println!("All ads saved to: {}", saved.display());

    if args.post {
        let publishers = build_publishers(&config, args.dry_run)?;
        let poster = CampaignPoster::new(&publishers, &store, &clock);
        let summary = poster
            .post_all(&mut campaign)
            .await
            .context("Failed to record posting outcomes")?;

        println!(
            "Posted: {} succeeded, {} failed, {} skipped",
            summary.succeeded, summary.failed, summary.skipped
        );
    }

    Ok(())
}
