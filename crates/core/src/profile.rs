//! Profile management
//!
//! A profile is a named storage zone together with its access key and
//! optional client overrides, persisted in the configuration file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ClientConfig, ConfigManager};
use crate::error::{Error, Result};

/// A named storage zone and its credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique name for this profile
    pub name: String,

    /// Storage zone name, unencoded
    pub zone: String,

    /// Storage zone access key (the zone password)
    pub access_key: String,

    /// Regional endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Percent-encode object names (disable to use virtual folders)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_encode: Option<bool>,

    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Profile {
    /// Create a new profile with required fields
    pub fn new(
        name: impl Into<String>,
        zone: impl Into<String>,
        access_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            zone: zone.into(),
            access_key: access_key.into(),
            endpoint: None,
            auto_encode: None,
            timeout_secs: None,
        }
    }

    /// Build the client configuration described by this profile
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::new(&self.access_key, &self.zone);

        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint)?;
        }
        if let Some(auto_encode) = self.auto_encode {
            config = config.with_auto_encode(auto_encode);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

/// Manager for profile operations
pub struct ProfileManager {
    config_manager: ConfigManager,
}

impl ProfileManager {
    /// Create a new ProfileManager with a specific ConfigManager
    pub fn with_config_manager(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// Create a new ProfileManager using the default config location
    pub fn new() -> Result<Self> {
        let config_manager = ConfigManager::new()?;
        Ok(Self { config_manager })
    }

    /// List all configured profiles
    pub fn list(&self) -> Result<Vec<Profile>> {
        let config = self.config_manager.load()?;
        Ok(config.profiles)
    }

    /// Get a profile by name
    pub fn get(&self, name: &str) -> Result<Profile> {
        let config = self.config_manager.load()?;
        config
            .profiles
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::ProfileNotFound(name.to_string()))
    }

    /// Resolve an explicit profile name, falling back to the configured default
    /// and then to the only profile if exactly one exists
    pub fn resolve(&self, name: Option<&str>) -> Result<Profile> {
        if let Some(name) = name {
            return self.get(name);
        }

        let mut config = self.config_manager.load()?;
        match config.defaults.profile {
            Some(default) => self.get(&default),
            None if config.profiles.len() == 1 => Ok(config.profiles.swap_remove(0)),
            None => Err(Error::Config(
                "No profile given and no default profile configured".into(),
            )),
        }
    }

    /// Add or update a profile
    pub fn set(&self, profile: Profile) -> Result<()> {
        if let Some(endpoint) = &profile.endpoint {
            url::Url::parse(endpoint)?;
        }

        let mut config = self.config_manager.load()?;
        config.profiles.retain(|p| p.name != profile.name);
        config.profiles.push(profile);

        self.config_manager.save(&config)
    }

    /// Make a profile the default one
    pub fn set_default(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        if !config.profiles.iter().any(|p| p.name == name) {
            return Err(Error::ProfileNotFound(name.to_string()));
        }
        config.defaults.profile = Some(name.to_string());
        self.config_manager.save(&config)
    }

    /// Remove a profile
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        let original_len = config.profiles.len();

        config.profiles.retain(|p| p.name != name);

        if config.profiles.len() == original_len {
            return Err(Error::ProfileNotFound(name.to_string()));
        }

        if config.defaults.profile.as_deref() == Some(name) {
            config.defaults.profile = None;
        }

        self.config_manager.save(&config)
    }

    /// Check if a profile exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        let config = self.config_manager.load()?;
        Ok(config.profiles.iter().any(|p| p.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_profile_manager() -> (ProfileManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let config_manager = ConfigManager::with_path(config_path);
        let profile_manager = ProfileManager::with_config_manager(config_manager);
        (profile_manager, temp_dir)
    }

    #[test]
    fn test_profile_new() {
        let profile = Profile::new("cdn", "assets", "secret");
        assert_eq!(profile.name, "cdn");
        assert_eq!(profile.zone, "assets");
        assert!(profile.endpoint.is_none());
        assert!(profile.auto_encode.is_none());
    }

    #[test]
    fn test_profile_client_config_overrides() {
        let mut profile = Profile::new("cdn", "my zone", "secret");
        profile.endpoint = Some("https://la.storage.bunnycdn.com".into());
        profile.auto_encode = Some(false);
        profile.timeout_secs = Some(30);

        let config = profile.client_config().unwrap();
        assert_eq!(config.zone(), "my%20zone");
        assert_eq!(config.endpoint(), "https://la.storage.bunnycdn.com");
        assert!(!config.auto_encode());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_profile_manager_set_and_get() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(Profile::new("cdn", "assets", "secret")).unwrap();

        let retrieved = manager.get("cdn").unwrap();
        assert_eq!(retrieved.zone, "assets");
        assert_eq!(retrieved.access_key, "secret");
    }

    #[test]
    fn test_profile_manager_list() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(Profile::new("a", "zone-a", "a")).unwrap();
        manager.set(Profile::new("b", "zone-b", "b")).unwrap();

        assert_eq!(manager.list().unwrap().len(), 2);
    }

    #[test]
    fn test_profile_manager_rejects_bad_endpoint() {
        let (manager, _temp_dir) = temp_profile_manager();

        let mut profile = Profile::new("cdn", "assets", "secret");
        profile.endpoint = Some("::nope::".into());
        assert!(manager.set(profile).is_err());
        assert!(!manager.exists("cdn").unwrap());
    }

    #[test]
    fn test_profile_manager_remove() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(Profile::new("cdn", "assets", "secret")).unwrap();
        manager.set_default("cdn").unwrap();
        assert!(manager.exists("cdn").unwrap());

        manager.remove("cdn").unwrap();
        assert!(!manager.exists("cdn").unwrap());
        assert!(matches!(
            manager.resolve(None).unwrap_err(),
            Error::Config(_)
        ));
    }

    #[test]
    fn test_profile_manager_remove_not_found() {
        let (manager, _temp_dir) = temp_profile_manager();

        let result = manager.remove("nonexistent");
        assert!(matches!(result.unwrap_err(), Error::ProfileNotFound(_)));
    }

    #[test]
    fn test_profile_manager_resolve() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(Profile::new("only", "zone", "key")).unwrap();
        assert_eq!(manager.resolve(None).unwrap().name, "only");

        manager.set(Profile::new("other", "zone2", "key2")).unwrap();
        assert!(manager.resolve(None).is_err());

        manager.set_default("other").unwrap();
        assert_eq!(manager.resolve(None).unwrap().name, "other");
        assert_eq!(manager.resolve(Some("only")).unwrap().name, "only");
        assert!(matches!(
            manager.resolve(Some("missing")).unwrap_err(),
            Error::ProfileNotFound(_)
        ));
    }

    #[test]
    fn test_profile_update_existing() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(Profile::new("cdn", "old", "a")).unwrap();
        manager.set(Profile::new("cdn", "new", "b")).unwrap();

        let profiles = manager.list().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].zone, "new");
    }
}
