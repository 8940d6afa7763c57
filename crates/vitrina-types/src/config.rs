//! Process configuration.
//!
//! `VitrinaConfig` mirrors `{data_dir}/config.toml`. Every field has a
//! default so an empty file (or no file at all) yields a usable config; the
//! infra loader layers environment variables on top.

use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// Top-level configuration for the catalog bot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VitrinaConfig {
    /// Chat user ids allowed to use the bot.
    #[serde(default)]
    pub admin_ids: Vec<i64>,

    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub media: MediaSettings,

    #[serde(default)]
    pub server: ServerSettings,
}

/// Where the catalog document lives and how it is published.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    /// Path of the JSON document inside the repository.
    #[serde(default = "default_catalog_file")]
    pub file: String,

    /// Working copy location; defaults to `{data_dir}/catalog`.
    #[serde(default)]
    pub repo_dir: Option<PathBuf>,

    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default = "default_git_host")]
    pub git_host: String,

    #[serde(default)]
    pub github_user: Option<String>,

    /// `owner/name` or just `name`.
    #[serde(default)]
    pub github_repo: Option<String>,

    #[serde(default, deserialize_with = "deserialize_secret")]
    pub github_token: Option<SecretString>,

    /// Plain remote URL or path, used instead of the GitHub triple.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Public catalog site; derived from the GitHub settings when absent.
    #[serde(default)]
    pub public_url: Option<String>,

    #[serde(default = "default_git_timeout_secs")]
    pub git_timeout_secs: u64,

    #[serde(default = "default_author_name")]
    pub author_name: String,

    #[serde(default = "default_author_email")]
    pub author_email: String,
}

fn default_catalog_file() -> String {
    "productos.json".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_git_host() -> String {
    "github.com".to_string()
}

fn default_git_timeout_secs() -> u64 {
    30
}

fn default_author_name() -> String {
    "UnderShoppBot".to_string()
}

fn default_author_email() -> String {
    "bot@under-shopp.local".to_string()
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            file: default_catalog_file(),
            repo_dir: None,
            branch: default_branch(),
            git_host: default_git_host(),
            github_user: None,
            github_repo: None,
            github_token: None,
            remote_url: None,
            public_url: None,
            git_timeout_secs: default_git_timeout_secs(),
            author_name: default_author_name(),
            author_email: default_author_email(),
        }
    }
}

/// How the catalog repository is reached.
#[derive(Debug, Clone)]
pub enum RemoteSpec {
    /// HTTPS remote authenticated with a token embedded at invocation time.
    Token {
        host: String,
        user: String,
        repo: String,
        token: SecretString,
    },
    /// A URL or path git can use as-is.
    Plain(String),
}

impl CatalogSettings {
    /// The configured remote, if any. A plain `remote_url` wins over the
    /// GitHub settings; the GitHub triple needs all of user, repo and token.
    pub fn remote(&self) -> Option<RemoteSpec> {
        if let Some(url) = self.remote_url.as_ref().filter(|u| !u.trim().is_empty()) {
            return Some(RemoteSpec::Plain(url.clone()));
        }
        match (&self.github_user, &self.github_repo, &self.github_token) {
            (Some(user), Some(repo), Some(token)) => Some(RemoteSpec::Token {
                host: self.git_host.clone(),
                user: user.clone(),
                repo: repo.clone(),
                token: token.clone(),
            }),
            _ => None,
        }
    }

    /// URL of the static catalog site, when it can be known.
    pub fn public_catalog_url(&self) -> Option<String> {
        if let Some(url) = &self.public_url {
            return Some(url.clone());
        }
        let user = self.github_user.as_deref()?;
        let repo = self.github_repo.as_deref()?;
        let name = repo.rsplit('/').next().unwrap_or(repo);
        Some(format!("https://{user}.github.io/{name}/"))
    }
}

/// Wizard session tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// Minutes without input before a wizard session is evicted.
    #[serde(default = "default_idle_minutes")]
    pub idle_minutes: u64,

    /// Maximum media items (images + videos) per product.
    #[serde(default = "default_media_limit")]
    pub media_limit: usize,
}

fn default_idle_minutes() -> u64 {
    30
}

fn default_media_limit() -> usize {
    30
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_minutes: default_idle_minutes(),
            media_limit: default_media_limit(),
        }
    }
}

/// Image host settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub imgbb_api_key: Option<SecretString>,

    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
}

fn default_upload_timeout_secs() -> u64 {
    30
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            imgbb_api_key: None,
            upload_timeout_secs: default_upload_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    10000
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Parse a comma-separated admin id list (`"123, 456"`).
pub fn parse_admin_ids(raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| ConfigError::InvalidAdminId(s.to_string()))
        })
        .collect()
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .filter(|s| !s.trim().is_empty())
        .map(SecretString::from))
}
