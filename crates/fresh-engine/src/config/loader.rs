use super::schema::FreshConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming a config file; wins over the search paths.
pub const CONFIG_ENV: &str = "FRESH_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A resolved configuration and the file it came from, if any.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: FreshConfig,
    pub source: Option<PathBuf>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolve the run configuration.
    ///
    /// The file is `explicit` when given, else `$FRESH_CONFIG`, else the first
    /// of `./fresh.yaml` and `~/.fresh/config.yaml` that exists; with none of
    /// them the defaults apply. `BASE_URL`/`HEADED` are overlaid afterwards and
    /// the result is validated.
    pub async fn load(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        let env_path = std::env::var(CONFIG_ENV).ok();
        let source = pick(explicit, env_path.as_deref(), &search_paths());

        let config = match &source {
            Some(path) => Self::load_from(path).await?,
            None => {
                debug!("no config file found, using defaults");
                FreshConfig::default()
            }
        }
        .apply_env();
        config.validate()?;

        if let Some(path) = &source {
            info!(path = %path.display(), "config file loaded");
        }
        Ok(LoadedConfig { config, source })
    }

    /// Parse one file. An empty file yields the defaults.
    pub async fn load_from(path: &Path) -> Result<FreshConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        if content.trim().is_empty() {
            return Ok(FreshConfig::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("./fresh.yaml")];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".fresh").join("config.yaml"));
    }
    paths
}

/// Explicit and environment paths are taken as-is so a typo surfaces as an
/// I/O error; search paths only count when they exist.
fn pick(explicit: Option<&Path>, env_path: Option<&str>, candidates: &[PathBuf]) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_path.map(str::trim).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    candidates.iter().find(|p| p.exists()).cloned()
}
