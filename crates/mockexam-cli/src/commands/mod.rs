pub mod account;
pub mod init;
pub mod results;
pub mod take;
pub mod upload;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mockexam_core::config::{load_config_from, MockexamConfig};
use mockexam_core::identity;
use mockexam_core::model::UserProfile;
use mockexam_core::store::JsonFileStore;

/// Resolved config plus the record store it points at.
pub struct Workspace {
    pub config: MockexamConfig,
    pub store: JsonFileStore,
}

impl Workspace {
    pub fn open(data_dir: Option<PathBuf>, config_path: Option<&Path>) -> Result<Self> {
        let mut config = load_config_from(config_path)?;
        if let Some(dir) = data_dir {
            config.data_dir = dir;
        }
        tracing::debug!(data_dir = %config.data_dir.display(), "opened workspace");
        let store = JsonFileStore::new(config.data_dir.clone());
        Ok(Self { config, store })
    }

    /// The logged-in user, or an error telling the user to log in.
    pub fn require_user(&self) -> Result<UserProfile> {
        identity::current_user(&self.store)
            .context("failed to read current user")?
            .ok_or_else(|| {
                anyhow::anyhow!("not logged in; run `mockexam login` or `mockexam signup` first")
            })
    }
}
