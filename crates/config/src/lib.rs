//! Layered configuration for folio.
//!
//! Sources, in increasing order of precedence:
//! 1. built-in defaults ([`Config::default()`]),
//! 2. a config file (TOML, YAML or JSON, picked by extension), either given
//!    explicitly or discovered as `folio.{toml,yaml,yml,json}` in the platform
//!    config directory,
//! 3. environment variables prefixed with `FOLIO_`, using `__` to separate
//!    nested keys (`FOLIO_SERVER__BIND=0.0.0.0:8080`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "FOLIO_";
const FILE_STEM: &str = "folio";
const FILE_EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "folio")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP server listens on.
    pub bind: String,
}
impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "127.0.0.1:3333".to_string() }
    }
}
impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind.parse::<SocketAddr>().or_raise(|| ErrorKind::Invalid("server.bind"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file; created on first start.
    pub path: PathBuf,
}
impl Default for DatabaseConfig {
    fn default() -> Self {
        let path = project_dirs()
            .map(|dirs| dirs.data_dir().join("folio.sqlite"))
            .unwrap_or_else(|| PathBuf::from("folio.sqlite"));
        Self { path }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverConfig {
    /// Root of the authoritative cover images; item `coverPath`s are
    /// relative to it.
    pub source_root: PathBuf,
    /// Root of the derived render cache. Safe to wipe at any time.
    pub cache_root: PathBuf,
    /// Largest width or height, in pixels, a render may have.
    pub max_dimension: u32,
}
impl Default for CoverConfig {
    fn default() -> Self {
        let dirs = project_dirs();
        Self {
            source_root: dirs
                .as_ref()
                .map(|dirs| dirs.data_dir().join("covers"))
                .unwrap_or_else(|| PathBuf::from("covers")),
            cache_root: dirs
                .as_ref()
                .map(|dirs| dirs.cache_dir().join("covers"))
                .unwrap_or_else(|| PathBuf::from("cache/covers")),
            max_dimension: 2048,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default `tracing` filter directive, overridden by `RUST_LOG`.
    pub level: String,
}
impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

/// A user allowed to call the API, keyed by bearer token in [`Config::users`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    pub id: String,
    /// Whether the user may update items.
    #[serde(default)]
    pub can_update: bool,
    /// Libraries the user may read. Absent means every library.
    #[serde(default)]
    pub libraries: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub covers: CoverConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub users: BTreeMap<String, UserConfig>,
}

impl Config {
    /// Locate `folio.{toml,yaml,yml,json}` in the platform config directory.
    pub fn default_file() -> Option<PathBuf> {
        let dir = project_dirs()?.config_dir().to_path_buf();
        FILE_EXTENSIONS
            .iter()
            .map(|ext| dir.join(FILE_STEM).with_extension(ext))
            .find(|path| path.is_file())
    }

    /// Assemble every configuration source without extracting it.
    ///
    /// An explicitly given `file` must exist; a discovered one is optional.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let file = match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::FileNotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_file(),
        };
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            tracing::debug!(path = %path.display(), "loading configuration file");
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(&path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(&path)),
                Some("json") => figment.merge(Json::file(&path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path)),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load and validate the configuration.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(file)?.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// A copy safe to print: user tokens are replaced by placeholders.
    pub fn redacted(&self) -> Self {
        let users = self
            .users
            .values()
            .enumerate()
            .map(|(index, user)| (format!("<redacted-{}>", index + 1), user.clone()))
            .collect();
        Self { users, ..self.clone() }
    }

    pub fn validate(&self) -> Result<()> {
        self.server.socket_addr()?;
        if !self.covers.source_root.is_absolute() {
            exn::bail!(ErrorKind::Invalid("covers.source_root"));
        }
        if !self.covers.cache_root.is_absolute() {
            exn::bail!(ErrorKind::Invalid("covers.cache_root"));
        }
        let (source, cache) = (&self.covers.source_root, &self.covers.cache_root);
        if source.starts_with(cache) || cache.starts_with(source) {
            // Purging an item's renders could delete source images.
            exn::bail!(ErrorKind::Invalid("covers.cache_root"));
        }
        if self.covers.max_dimension == 0 {
            exn::bail!(ErrorKind::Invalid("covers.max_dimension"));
        }
        if self.users.iter().any(|(token, user)| token.is_empty() || user.id.is_empty()) {
            exn::bail!(ErrorKind::Invalid("users"));
        }
        Ok(())
    }
}
