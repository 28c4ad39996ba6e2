//! Campaign generation use case
//!
//! Iterates the requested platforms, generating ad copy and (optionally) a
//! promotional image for each. Platforms whose generation fails are skipped
//! with a warning, never aborting the run; only successful generations end up
//! in the campaign record.

use std::path::PathBuf;

use crate::model::{AppInfo, Campaign, CampaignAd, Platform, campaign_id};
use crate::ports::{Clock, ContentModel, ImageModel};
use crate::settings::PlatformCatalog;

/// Options for a generation run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Whether to also generate promotional images
    pub generate_images: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            generate_images: true,
        }
    }
}

/// Use case for generating a campaign across platforms
pub struct CampaignGenerator<'a> {
    content: &'a dyn ContentModel,
    image: &'a dyn ImageModel,
    catalog: &'a PlatformCatalog,
    clock: &'a dyn Clock,
    output_dir: PathBuf,
}

impl<'a> CampaignGenerator<'a> {
    pub fn new(
        content: &'a dyn ContentModel,
        image: &'a dyn ImageModel,
        catalog: &'a PlatformCatalog,
        clock: &'a dyn Clock,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            content,
            image,
            catalog,
            clock,
            output_dir: output_dir.into(),
        }
    }

    /// Generate ads for the requested platforms, in caller-supplied order.
    ///
    /// Unknown platform names and platforms without catalog settings are
    /// logged and skipped; they never fail the run.
    pub async fn generate(
        &self,
        app: &AppInfo,
        platforms: &[String],
        options: &GenerateOptions,
    ) -> Campaign {
        let mut campaign = Campaign::new(campaign_id(self.clock.now()));

        for name in platforms {
            let platform: Platform = match name.parse() {
                Ok(p) => p,
                Err(_) => {
                    tracing::warn!(platform = %name, "Platform not supported, skipping");
                    continue;
                }
            };

            let Some(settings) = self.catalog.get(platform) else {
                tracing::warn!(%platform, "No settings configured for platform, skipping");
                continue;
            };

            tracing::info!(%platform, app = %app.name, "Generating ad content");

            let mut content = match self.content.generate_ad(app, platform, settings).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(%platform, error = %e, "Ad generation failed, skipping platform");
                    continue;
                }
            };

            if options.generate_images {
                match self
                    .image
                    .generate(
                        platform,
                        settings,
                        &content.suggested_image_description,
                        &self.output_dir,
                    )
                    .await
                {
                    Ok(path) => {
                        tracing::info!(%platform, path = %path.display(), "Generated ad image");
                        content.image_path = Some(path);
                    }
                    Err(e) => {
                        // A missing image degrades to a text-only ad later
                        tracing::warn!(%platform, error = %e, "Image generation failed");
                    }
                }
            }

            campaign.ads.insert(platform, CampaignAd::new(content));
        }

        campaign
    }
}
