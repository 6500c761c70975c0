//! Configuration management
//!
//! Two layers live here:
//! - [`ClientConfig`], the immutable per-client settings a [`crate::StorageClient`] is built from.
//! - [`Config`] / [`ConfigManager`], the persisted TOML file holding CLI defaults and profiles,
//!   stored at ~/.config/bunstore/config.toml.
//!
//! PROTECTED FILE: Changes to schema_version require migration support.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::encode_component;
use crate::error::{Error, Result};
use crate::profile::Profile;

/// Fixed origin of the storage API
pub const DEFAULT_ENDPOINT: &str = "https://storage.bunnycdn.com";

/// Default request timeout, generous enough for multi-gigabyte transfers
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6 * 60 * 60);

/// Default size of a single copy chunk: 80 KiB
pub const DEFAULT_CHUNK_SIZE: usize = 80 * 1024;

/// Smallest accepted chunk size
pub const MIN_CHUNK_SIZE: usize = 1024;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "BUNSTORE_CONFIG_DIR";

/// Current configuration schema version
///
/// IMPORTANT: Bumping this version requires:
/// 1. Adding a migration in ConfigManager::migrate
/// 2. Updating migration tests
/// 3. Marking the change as BREAKING
pub const SCHEMA_VERSION: u32 = 1;

/// Default output format
const DEFAULT_OUTPUT: &str = "human";

/// Settings owned by a single storage client
///
/// The zone and access key are percent-encoded when assigned, so the stored
/// values are always URI-safe. Object names are encoded per request instead,
/// because that depends on `auto_encode`.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    access_key: String,
    zone: String,
    endpoint: String,
    auto_encode: bool,
    timeout: Duration,
    chunk_size: usize,
}

impl ClientConfig {
    /// Create a configuration for the given access key and storage zone
    pub fn new(access_key: impl AsRef<str>, zone: impl AsRef<str>) -> Self {
        Self {
            access_key: encode_component(access_key.as_ref()).into_owned(),
            zone: encode_component(zone.as_ref()).into_owned(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            auto_encode: true,
            timeout: DEFAULT_TIMEOUT,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Toggle percent-encoding of object names
    ///
    /// Disabling it allows `/` in names to address virtual folders.
    pub fn with_auto_encode(mut self, enabled: bool) -> Self {
        self.auto_encode = enabled;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Point the client at a different origin, e.g. a regional storage endpoint
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        let parsed = url::Url::parse(endpoint)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Endpoint must be http or https: {endpoint}"
            )));
        }
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(MIN_CHUNK_SIZE);
        self
    }

    /// Encoded access key
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Encoded storage zone
    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn auto_encode(&self) -> bool {
        self.auto_encode
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_key", &"<redacted>")
            .field("zone", &self.zone)
            .field("endpoint", &self.endpoint)
            .field("auto_encode", &self.auto_encode)
            .field("timeout", &self.timeout)
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

/// Main configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Configured storage zone profiles
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

/// Default settings for CLI behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Output format: "human" or "json"
    #[serde(default = "default_output")]
    pub output: String,

    /// Show progress bars
    #[serde(default = "default_true")]
    pub progress: bool,

    /// Profile used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            progress: true,
            profile: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            profiles: Vec::new(),
        }
    }
}

/// Configuration manager handles loading and saving config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    ///
    /// `BUNSTORE_CONFIG_DIR` takes precedence over the platform config directory.
    pub fn new() -> Result<Self> {
        let config_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
                .join("bunstore"),
        };
        Ok(Self {
            config_path: config_dir.join("config.toml"),
        })
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    /// If the schema version doesn't match, attempts migration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        if config.schema_version < SCHEMA_VERSION {
            config = self.migrate(config)?;
        } else if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade bunstore.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        Ok(config)
    }

    /// Save configuration to disk
    ///
    /// Creates parent directories if they don't exist.
    /// Sets file permissions to 600 (owner read/write only), the file holds access keys.
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.config_path, permissions)?;
        }

        Ok(())
    }

    fn migrate(&self, mut config: Config) -> Result<Config> {
        // Version 0 files predate the schema field and need no rewrite.
        config.schema_version = SCHEMA_VERSION;
        Ok(config)
    }
}
