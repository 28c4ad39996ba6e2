//! Campaigns command - inspect and manage saved campaign records

use anyhow::{Context, Result};
use std::path::PathBuf;

use ad_poster_adapters::store::FsCampaignStore;
use ad_poster_domain::{CampaignStore, PostingStatus};

use crate::args::{CampaignsArgs, CampaignsCommands};
use crate::commands::{print_ad_preview, resolve_campaign_id};
use crate::config::AppConfig;

pub async fn execute(args: CampaignsArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let store = FsCampaignStore::new(&config.general.output_dir);

    match args.command {
        CampaignsCommands::List => list(&store).await,
        CampaignsCommands::Show { campaign, json } => show(&store, campaign, json).await,
        CampaignsCommands::Delete { campaign } => delete(&store, &campaign).await,
    }
}

async fn list(store: &FsCampaignStore) -> Result<()> {
    let ids = store.list().await.context("Failed to list campaigns")?;

    if ids.is_empty() {
        println!("No campaigns found in {}", store.dir().display());
        return Ok(());
    }

    for id in ids {
        match store.load(&id).await {
            Ok(campaign) => {
                let platforms: Vec<String> = campaign
                    .ads
                    .iter()
                    .map(|(platform, ad)| {
                        let status = match ad.posting_status {
                            Some(PostingStatus::Success) => "posted",
                            Some(PostingStatus::Failed) => "failed",
                            None => "pending",
                        };
                        format!("{platform}({status})")
                    })
                    .collect();
                println!("{id}  {}", platforms.join(" "));
            }
            Err(e) => {
                tracing::warn!(campaign = %id, error = %e, "Failed to read campaign");
                println!("{id}  (unreadable)");
            }
        }
    }

    Ok(())
}

async fn show(store: &FsCampaignStore, campaign: Option<String>, json: bool) -> Result<()> {
    let id = resolve_campaign_id(store, campaign).await?;
    let campaign = store
        .load(&id)
        .await
        .with_context(|| format!("Failed to load campaign {id}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&campaign.ads)?);
    } else {
        println!("Campaign: {id}");
        for ad in campaign.ads.values() {
            print_ad_preview(ad);
        }
    }

    Ok(())
}

async fn delete(store: &FsCampaignStore, id: &str) -> Result<()> {
    store
        .delete(id)
        .await
        .with_context(|| format!("Failed to delete campaign {id}"))?;
    println!("Deleted campaign {id} and its images");
    Ok(())
}
