pub mod completion;
pub mod config;
pub mod interactive;
pub mod restaurants;
pub mod session;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, Result};
use client::{EatOffClient, FilePreferences, RemoteApi, SessionStore};
use shared::config::ClientConfig;
use tracing::debug;

/// Services shared by every command.
pub struct Context {
    pub api: Arc<EatOffClient>,
    pub session: SessionStore,
    pub session_path: PathBuf,
}

impl Context {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let prefs = FilePreferences::open(&config.data_dir);
        let session_path = prefs.path().to_path_buf();
        let session = SessionStore::new(Arc::new(prefs));

        let api = EatOffClient::from_config(&config).context("failed to build HTTP client")?;
        api.set_auth_token(session.auth_token());
        debug!(
            base_url = %api.base_url(),
            session = %session_path.display(),
            "context ready"
        );

        Ok(Self {
            api: Arc::new(api),
            session,
            session_path,
        })
    }
}
