//! Configuration loader for Vitrina.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`VitrinaConfig`], then layers environment variables on top. Falls back to
//! defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::SecretString;
use vitrina_types::config::{VitrinaConfig, parse_admin_ids};

use crate::filesystem::catalog_dir;

/// Load configuration from `{data_dir}/config.toml` and the process
/// environment.
pub async fn load_config(data_dir: &Path) -> VitrinaConfig {
    let mut config = load_config_file(data_dir).await;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Load `{data_dir}/config.toml` only.
///
/// - Missing file: returns [`VitrinaConfig::default()`].
/// - Unreadable or malformed file: logs a warning and returns the default.
pub async fn load_config_file(data_dir: &Path) -> VitrinaConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return VitrinaConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return VitrinaConfig::default();
        }
    };

    match toml::from_str::<VitrinaConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            VitrinaConfig::default()
        }
    }
}

/// Apply environment overrides. `lookup` is `std::env::var` in production.
///
/// Blank values are ignored. Values that fail to parse are logged and
/// ignored, keeping whatever the file said.
pub fn apply_env_overrides(config: &mut VitrinaConfig, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(raw) = get("ADMIN_IDS") {
        match parse_admin_ids(&raw) {
            Ok(ids) => config.admin_ids = ids,
            Err(e) => tracing::warn!(error = %e, "ignoring ADMIN_IDS"),
        }
    }

    let catalog = &mut config.catalog;
    if let Some(user) = get("GITHUB_USER") {
        catalog.github_user = Some(user.trim().to_string());
    }
    if let Some(repo) = get("GITHUB_REPO") {
        catalog.github_repo = Some(repo.trim().to_string());
    }
    if let Some(token) = get("GITHUB_TOKEN") {
        catalog.github_token = Some(SecretString::from(token.trim().to_string()));
    }
    if let Some(branch) = get("GITHUB_BRANCH") {
        catalog.branch = branch.trim().to_string();
    }
    if let Some(file) = get("CATALOG_FILE") {
        catalog.file = file.trim().to_string();
    }
    if let Some(secs) = parsed::<u64>(&get, "GIT_TIMEOUT_SECS") {
        catalog.git_timeout_secs = secs;
    }

    if let Some(key) = get("IMGBB_API_KEY") {
        config.media.imgbb_api_key = Some(SecretString::from(key.trim().to_string()));
    }
    if let Some(port) = parsed::<u16>(&get, "PORT") {
        config.server.port = port;
    }
    if let Some(minutes) = parsed::<u64>(&get, "SESSION_IDLE_MINUTES") {
        config.session.idle_minutes = minutes;
    }
}

fn parsed<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = get(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable environment value");
            None
        }
    }
}

/// Working copy location: `catalog.repo_dir` or `{data_dir}/catalog`.
pub fn resolve_repo_dir(config: &VitrinaConfig, data_dir: &Path) -> PathBuf {
    config
        .catalog
        .repo_dir
        .clone()
        .unwrap_or_else(|| catalog_dir(data_dir))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;
    use tempfile::TempDir;
    use vitrina_types::config::RemoteSpec;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[tokio::test]
    async fn load_config_file_missing_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config_file(tmp.path()).await;
        assert!(config.admin_ids.is_empty());
        assert_eq!(config.server.port, 10000);
    }

    #[tokio::test]
    async fn load_config_file_valid_toml() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            "admin_ids = [42]\n\n[catalog]\nremote_url = \"/srv/catalog.git\"\n",
        )
        .await
        .unwrap();
        let config = load_config_file(tmp.path()).await;
        assert_eq!(config.admin_ids, vec![42]);
        assert!(matches!(config.catalog.remote(), Some(RemoteSpec::Plain(_))));
    }

    #[tokio::test]
    async fn load_config_file_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "admin_ids = \"not a list\"")
            .await
            .unwrap();
        let config = load_config_file(tmp.path()).await;
        assert!(config.admin_ids.is_empty());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = VitrinaConfig::default();
        config.admin_ids = vec![1];
        apply_env_overrides(
            &mut config,
            env(&[
                ("ADMIN_IDS", "10, 20"),
                ("GITHUB_USER", "undershopp"),
                ("GITHUB_REPO", "catalogo"),
                ("GITHUB_TOKEN", "ghp_env"),
                ("GITHUB_BRANCH", "gh-pages"),
                ("IMGBB_API_KEY", "imgkey"),
                ("PORT", "8080"),
                ("SESSION_IDLE_MINUTES", "5"),
                ("GIT_TIMEOUT_SECS", "12"),
            ]),
        );
        assert_eq!(config.admin_ids, vec![10, 20]);
        assert_eq!(config.catalog.branch, "gh-pages");
        assert_eq!(config.catalog.git_timeout_secs, 12);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.session.idle_minutes, 5);
        assert_eq!(
            config.media.imgbb_api_key.as_ref().unwrap().expose_secret(),
            "imgkey"
        );
        assert!(matches!(
            config.catalog.remote(),
            Some(RemoteSpec::Token { ref user, .. }) if user == "undershopp"
        ));
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let mut config = VitrinaConfig::default();
        config.admin_ids = vec![7];
        apply_env_overrides(
            &mut config,
            env(&[("ADMIN_IDS", "7,abc"), ("PORT", "http"), ("CATALOG_FILE", "  ")]),
        );
        assert_eq!(config.admin_ids, vec![7]);
        assert_eq!(config.server.port, 10000);
        assert_eq!(config.catalog.file, "productos.json");
    }

    #[test]
    fn repo_dir_defaults_under_data_dir() {
        let mut config = VitrinaConfig::default();
        assert_eq!(
            resolve_repo_dir(&config, Path::new("/data")),
            PathBuf::from("/data/catalog")
        );
        config.catalog.repo_dir = Some(PathBuf::from("/elsewhere"));
        assert_eq!(
            resolve_repo_dir(&config, Path::new("/data")),
            PathBuf::from("/elsewhere")
        );
    }
}
