//! Persistent settings, stored as TOML in the user's config directory.

use crate::adb::AdbBackend;
use crate::ride::RideParameters;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Value shipped in the default config, never a real client ID.
pub const CLIENT_ID_PLACEHOLDER: &str = "insert_your_client_id_here";

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot locate the user config directory")]
    NoConfigDir,
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Please set client_id in {0}")]
    PlaceholderClientId(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Issued to the integrating application by the ride service.
    pub client_id: String,
    pub backend: AdbBackend,
    /// Serial of the target device; ADB's default device when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<u16>,
    /// Trip used by every request that doesn't override it.
    pub ride: RideParameters,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: CLIENT_ID_PLACEHOLDER.to_string(),
            backend: AdbBackend::default(),
            device: None,
            user: None,
            ride: RideParameters::demo(),
        }
    }
}

impl Config {
    /// `<config dir>/fidride/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("fidride").join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Read `path`, writing the defaults there first if it doesn't exist yet.
    pub fn load_or_init(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::load(path);
        }
        let config = Self::default();
        if let Err(e) = config.save(path) {
            warn!("Cannot write default config: {e}");
        } else {
            info!("Wrote default config to {}", path.display());
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, toml::to_string_pretty(self)?).map_err(io_err)
    }

    /// The configured client ID, unless it was left at its placeholder.
    ///
    /// `path` is only used to tell the user where to fix it.
    pub fn client_id(&self, path: &Path) -> Result<&str, ConfigError> {
        let id = self.client_id.trim();
        if id.is_empty() || id == CLIENT_ID_PLACEHOLDER {
            Err(ConfigError::PlaceholderClientId(path.to_path_buf()))
        } else {
            Ok(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("fidride-test-{}-{name}", std::process::id()))
            .join(CONFIG_FILE)
    }

    #[test]
    fn placeholder_is_rejected() {
        let path = Path::new("/tmp/config.toml");
        let mut config = Config::default();
        assert!(matches!(
            config.client_id(path),
            Err(ConfigError::PlaceholderClientId(_))
        ));
        config.client_id = "  ".into();
        assert!(config.client_id(path).is_err());
        config.client_id = "abc123".into();
        assert_eq!(config.client_id(path).unwrap(), "abc123");
    }

    #[test]
    fn partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            client_id = "abc"
            backend = "system"
            "#,
        )
        .unwrap();
        assert_eq!(config.client_id, "abc");
        assert_eq!(config.backend, AdbBackend::System);
        assert_eq!(config.ride, RideParameters::demo());
    }

    #[test]
    fn ride_section_parses() {
        let config: Config = toml::from_str(
            r#"
            [ride]
            product_id = "p"

            [ride.dropoff]
            latitude = 1.5
            longitude = -2.25
            nickname = "home"
            "#,
        )
        .unwrap();
        assert_eq!(config.ride.product_id(), Some("p"));
        assert!(config.ride.pickup().is_none());
        let dropoff = config.ride.dropoff().unwrap();
        assert_eq!(dropoff.nickname.as_deref(), Some("home"));
        assert!(dropoff.formatted_address.is_none());
    }

    #[test]
    fn init_writes_then_loads() {
        let path = scratch_path("init");
        let _ = fs::remove_file(&path);

        let written = Config::load_or_init(&path).unwrap();
        assert!(path.exists());
        let read = Config::load(&path).unwrap();
        assert_eq!(written, read);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            toml::from_str::<Config>("client_id = ").map_err(ConfigError::from),
            Err(ConfigError::Parse(_))
        ));
    }
}
