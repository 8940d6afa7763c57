//! Application state wiring the catalog, sessions and bot together.
//!
//! The mirror is chosen at startup: a git mirror when a remote is configured,
//! a local file otherwise. Both are erased behind [`BoxCatalogMirror`] so the
//! rest of the binary has a single concrete store type.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use vitrina_core::access::AccessGate;
use vitrina_core::bot::CatalogBot;
use vitrina_core::catalog::{BoxCatalogMirror, CatalogMirror, CatalogStore};
use vitrina_core::media::BoxMediaExternalizer;
use vitrina_core::session::SessionRegistry;
use vitrina_infra::config::{load_config, resolve_repo_dir};
use vitrina_infra::filesystem::resolve_data_dir;
use vitrina_infra::git::GitCatalogMirror;
use vitrina_infra::local::LocalCatalogMirror;
use vitrina_infra::media::ImgbbExternalizer;
use vitrina_types::config::VitrinaConfig;

pub type ConcreteStore = CatalogStore<BoxCatalogMirror>;
pub type ConcreteBot = CatalogBot<BoxCatalogMirror>;

/// A flush leg may run several git commands, each bounded on its own.
const GIT_COMMANDS_PER_LEG: u64 = 4;

/// Shared application state, used by the CLI commands and the HTTP router.
#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<ConcreteBot>,
    pub store: Arc<ConcreteStore>,
    pub sessions: Arc<SessionRegistry>,
    pub config: Arc<VitrinaConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Resolve the data directory, load configuration and wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;
        let config = load_config(&data_dir).await;
        Ok(Self::from_config(config, data_dir))
    }

    pub fn from_config(config: VitrinaConfig, data_dir: PathBuf) -> Self {
        let repo_dir = resolve_repo_dir(&config, &data_dir);

        let mirror = match config.catalog.remote() {
            Some(remote) => {
                let git = GitCatalogMirror::new(repo_dir, &remote, &config.catalog);
                tracing::info!(mirror = %git.describe(), "using git catalog mirror");
                BoxCatalogMirror::new(git)
            }
            None => {
                let local = LocalCatalogMirror::new(&repo_dir, &config.catalog.file);
                tracing::warn!(
                    mirror = %local.describe(),
                    "no remote repository configured, catalog will not be published"
                );
                BoxCatalogMirror::new(local)
            }
        };

        let leg_timeout =
            Duration::from_secs(config.catalog.git_timeout_secs.max(1) * GIT_COMMANDS_PER_LEG);
        let store = Arc::new(CatalogStore::new(mirror).with_leg_timeout(leg_timeout));

        let sessions = Arc::new(SessionRegistry::new(
            Duration::from_secs(config.session.idle_minutes.max(1) * 60),
            config.session.media_limit,
        ));

        if config.admin_ids.is_empty() {
            tracing::warn!("no admin ids configured, every user will be denied");
        }
        let gate = AccessGate::new(config.admin_ids.iter().copied());

        let mut bot = CatalogBot::new(store.clone(), sessions.clone(), gate)
            .with_catalog_url(config.catalog.public_catalog_url());
        if let Some(media) = build_media_host(&config) {
            bot = bot.with_media(media);
        }

        Self {
            bot: Arc::new(bot),
            store,
            sessions,
            config: Arc::new(config),
            data_dir,
        }
    }
}

fn build_media_host(config: &VitrinaConfig) -> Option<BoxMediaExternalizer> {
    let key = config.media.imgbb_api_key.clone()?;
    let timeout = Duration::from_secs(config.media.upload_timeout_secs.max(1));
    match ImgbbExternalizer::new(key, timeout) {
        Ok(host) => {
            tracing::info!("uploads go to imgbb");
            Some(BoxMediaExternalizer::new(host))
        }
        Err(e) => {
            tracing::warn!(error = %e, "image host unavailable, accepting links only");
            None
        }
    }
}
