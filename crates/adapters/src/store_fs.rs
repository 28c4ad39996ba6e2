//! Filesystem campaign store
//!
//! One pretty-printed JSON document per campaign under the output directory,
//! rewritten wholesale on every save. The timestamp-based ids double as a
//! newest-first sort key for listing.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use ad_poster_domain::{Campaign, CampaignAd, CampaignStore, Platform, StoreError};

pub struct FsCampaignStore {
    dir: PathBuf,
}

impl FsCampaignStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl CampaignStore for FsCampaignStore {
    async fn save(&self, campaign: &Campaign) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(&campaign.id);
        let json = serde_json::to_string_pretty(&campaign.ads)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        fs::write(&path, json).await?;

        tracing::debug!(path = %path.display(), "Saved campaign record");
        Ok(path)
    }

    async fn load(&self, id: &str) -> Result<Campaign, StoreError> {
        let path = self.path_for(id);
        let data = fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StoreError::NotFound(id.to_string())
            } else {
                StoreError::Io(e)
            }
        })?;

        let ads: BTreeMap<Platform, CampaignAd> =
            serde_json::from_str(&data).map_err(|e| StoreError::Serialization(e.to_string()))?;

        Ok(Campaign {
            id: id.to_string(),
            ads,
        })
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem() {
                    ids.push(stem.to_string_lossy().into_owned());
                }
            }
        }

        // Timestamp-named ids sort chronologically; newest first
        ids.sort_by(|a, b| b.cmp(a));
        Ok(ids)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let campaign = self.load(id).await?;

        for image_path in campaign.image_paths() {
            match fs::remove_file(image_path).await {
                Ok(()) => {
                    tracing::debug!(path = %image_path.display(), "Removed campaign image")
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %image_path.display(), error = %e, "Failed to remove image")
                }
            }
        }

        fs::remove_file(self.path_for(id)).await?;
        Ok(())
    }
}
