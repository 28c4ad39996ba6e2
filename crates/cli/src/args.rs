//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// ad-poster: generate AI-written social media ads and publish them
#[derive(Parser, Debug)]
#[command(name = "ad-poster")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate ad content (and images) for an app
    Generate(GenerateArgs),

    /// Post a generated campaign to its platforms
    Post(PostArgs),

    /// Inspect and manage saved campaigns
    Campaigns(CampaignsArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// App template id from the config file
    #[arg(long)]
    pub app: String,

    /// Platforms to generate for (comma-separated; default: all)
    #[arg(long, value_delimiter = ',')]
    pub platforms: Option<Vec<String>>,

    /// Generate text only, no promotional images
    #[arg(long)]
    pub skip_images: bool,

    /// Post the campaign right after generating it
    #[arg(long)]
    pub post: bool,

    /// Use stub models and publishers (no network, nothing published)
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct PostArgs {
    /// Campaign id (default: the newest campaign)
    #[arg(long)]
    pub campaign: Option<String>,

    /// Post only this platform's ad
    #[arg(long)]
    pub platform: Option<String>,

    /// Record posts instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct CampaignsArgs {
    #[command(subcommand)]
    pub command: CampaignsCommands,
}

#[derive(Subcommand, Debug)]
pub enum CampaignsCommands {
    /// List saved campaigns, newest first
    List,

    /// Show one campaign's ads
    Show {
        /// Campaign id (default: the newest campaign)
        #[arg(long)]
        campaign: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a campaign record and its images
    Delete {
        /// Campaign id
        #[arg(long)]
        campaign: String,
    },
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
