//! Post command - publish a saved campaign

use anyhow::{Context, Result, bail};
use std::path::PathBuf;

use ad_poster_adapters::store::FsCampaignStore;
use ad_poster_domain::{
    CampaignStore, Platform, PostingStatus, SystemClock, usecases::CampaignPoster,
};

use crate::args::PostArgs;
use crate::commands::{build_publishers, resolve_campaign_id};
use crate::config::AppConfig;

pub async fn execute(args: PostArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let store = FsCampaignStore::new(&config.general.output_dir);

    let id = resolve_campaign_id(&store, args.campaign).await?;
    let mut campaign = store
        .load(&id)
        .await
        .with_context(|| format!("Failed to load campaign {id}"))?;

    let publishers = build_publishers(&config, args.dry_run)?;
    if publishers.is_empty() {
        bail!("No platforms are enabled; enable one in the config or pass --dry-run");
    }

    let clock = SystemClock;
    let poster = CampaignPoster::new(&publishers, &store, &clock);

    let summary = match &args.platform {
        Some(name) => {
            let platform: Platform = name
                .parse()
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            poster.post_platform(&mut campaign, platform).await?
        }
        None => poster.post_all(&mut campaign).await?,
    };

    println!("Campaign {id}:");
    for (platform, ad) in &campaign.ads {
        match (ad.posting_status, &ad.error_details) {
            (Some(PostingStatus::Success), _) => println!("  {platform}: success"),
            (Some(PostingStatus::Failed), Some(details)) => {
                println!(
                    "  {platform}: failed ({}) {}",
                    details.error_type, details.message
                )
            }
            (Some(PostingStatus::Failed), None) => println!("  {platform}: failed"),
            (None, _) => println!("  {platform}: not attempted"),
        }
    }
    println!(
        "Posted: {} succeeded, {} failed, {} skipped",
        summary.succeeded, summary.failed, summary.skipped
    );

    if summary.attempted() > 0 && summary.succeeded == 0 {
        bail!("All posting attempts failed");
    }

    Ok(())
}
